//! C-compatible FFI API for embedding the document builder.
//!
//! # ABI Contract
//!
//! All exported functions use `extern "C"` calling convention and `#[no_mangle]`
//! to ensure stable symbol names.
//!
//! ## Memory management
//! - Strings returned through out-parameters are allocated on the Rust heap.
//! - Callers **must** free them with `rf_free_string`.
//! - Passing a null pointer to `rf_free_string` is a no-op.
//!
//! ## Error handling
//! - Functions that can fail return a `c_int` (0 = success, non-zero = error).
//! - Error details can be retrieved via `rf_last_error`.
//!
//! ## Thread safety
//! - `rf_last_error` uses a thread-local, so it is safe to call from
//!   multiple threads.
//!
//! Rendering is left to the host: the FFI only builds the print-ready
//! document from a page snapshot.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::ptr;

use crate::config::ExportConfig;
use crate::dom::parse_html;
use crate::pipeline::prepare_page;
use crate::snapshot::FixedStyles;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Input of [`rf_build_document`]. Every field except `page_html` may be
/// `NULL`, which selects the default.
#[repr(C)]
pub struct RfDocumentRequest {
    /// Null-terminated UTF-8 page snapshot containing the preview element.
    pub page_html: *const c_char,
    /// `id` of the preview element (default "resume-preview").
    pub preview_id: *const c_char,
    /// Style profile name (default "single-column").
    pub profile: *const c_char,
    /// Accent colour replacing the profile's primary colour.
    pub theme_color: *const c_char,
    /// JSON object deep-merged over the profile.
    pub overrides_json: *const c_char,
    /// Captured live-page stylesheet text.
    pub live_styles: *const c_char,
}

/// Read an optional C string. `Err` carries the field name on bad UTF-8.
///
/// # Safety
/// `p`, if non-null, must point to a valid null-terminated string.
unsafe fn opt_str<'a>(p: *const c_char, field: &str) -> Result<Option<&'a str>, String> {
    if p.is_null() {
        return Ok(None);
    }
    CStr::from_ptr(p)
        .to_str()
        .map(Some)
        .map_err(|e| format!("Invalid UTF-8 in {field}: {e}"))
}

/// # Safety
/// All non-null pointers in `req` must be valid null-terminated strings.
unsafe fn build(req: &RfDocumentRequest) -> Result<(String, String), (c_int, String)> {
    let page_html = match opt_str(req.page_html, "page_html") {
        Ok(Some(s)) => s,
        Ok(None) => return Err((1, "Null pointer argument".to_string())),
        Err(e) => return Err((2, e)),
    };

    let preview_id = opt_str(req.preview_id, "preview_id").map_err(|e| (2, e))?;
    let profile = opt_str(req.profile, "profile").map_err(|e| (2, e))?;
    let theme_color = opt_str(req.theme_color, "theme_color").map_err(|e| (2, e))?;
    let overrides = opt_str(req.overrides_json, "overrides_json").map_err(|e| (2, e))?;
    let live_styles = opt_str(req.live_styles, "live_styles").map_err(|e| (2, e))?;

    let mut config = ExportConfig::default();
    if let Some(id) = preview_id {
        config.preview_id = id.to_string();
    }
    if let Some(name) = profile {
        config.profile = name.to_string();
    }
    config.theme_color = theme_color.map(str::to_string);
    if let Some(json) = overrides {
        config.overrides = Some(
            serde_json::from_str(json).map_err(|e| (3, format!("Invalid overrides JSON: {e}")))?,
        );
    }

    let page = parse_html(page_html);
    let snapshot = FixedStyles::new(live_styles.unwrap_or_default());
    let doc = prepare_page(&page, &config, &snapshot).map_err(|e| (4, e.to_string()))?;
    let report =
        serde_json::to_string(&doc).map_err(|e| (5, format!("Cannot serialize report: {e}")))?;
    Ok((doc.html, report))
}

fn into_c_string(s: String) -> Result<*mut c_char, String> {
    CString::new(s)
        .map(CString::into_raw)
        .map_err(|_| "Output contained null byte".to_string())
}

/// Build the print-ready HTML document for the preview in a page snapshot.
///
/// # Parameters
/// - `req`: the request; see [`RfDocumentRequest`]
/// - `out_html`: on success, receives the null-terminated document
/// - `out_report`: optional; on success receives a JSON report of what the
///   sanitizer and normalizer did. Pass `NULL` to skip it.
///
/// # Returns
/// `0` on success. `1` null argument, `2` invalid UTF-8, `3` invalid
/// overrides, `4` export error (e.g. preview not found), `5` output error.
///
/// # Safety
/// - `req` must point to a valid [`RfDocumentRequest`] whose non-null
///   fields are valid null-terminated strings.
/// - `out_html` must be a valid pointer; `out_report` must be valid or null.
/// - The caller must free the returned strings with `rf_free_string`.
#[no_mangle]
pub unsafe extern "C" fn rf_build_document(
    req: *const RfDocumentRequest,
    out_html: *mut *mut c_char,
    out_report: *mut *mut c_char,
) -> c_int {
    if req.is_null() || out_html.is_null() {
        set_last_error("Null pointer argument");
        return 1;
    }

    let (html, report) = match build(&*req) {
        Ok(v) => v,
        Err((code, msg)) => {
            set_last_error(&msg);
            return code;
        }
    };

    let html_ptr = match into_c_string(html) {
        Ok(p) => p,
        Err(e) => {
            set_last_error(&e);
            return 5;
        }
    };
    if !out_report.is_null() {
        *out_report = into_c_string(report).unwrap_or(ptr::null_mut());
    }
    *out_html = html_ptr;
    0
}

/// Free a string returned by `rf_build_document`.
///
/// # Safety
/// `s` must have been returned by Rust's `CString::into_raw`.
#[no_mangle]
pub unsafe extern "C" fn rf_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = CString::from_raw(s);
    }
}

/// Retrieve the last error message. Returns a null-terminated string.
///
/// The returned pointer is valid until the next `rf_*` call on the same
/// thread. The caller should **not** free this pointer – it is managed
/// internally.
///
/// Returns null if no error has occurred.
#[no_mangle]
pub extern "C" fn rf_last_error() -> *const c_char {
    LAST_ERROR.with(|e| {
        let borrow = e.borrow();
        match borrow.as_ref() {
            Some(cs) => cs.as_ptr(),
            None => ptr::null(),
        }
    })
}

/// Return the library version as a null-terminated string.
/// The caller must **not** free this pointer.
#[no_mangle]
pub extern "C" fn rf_version() -> *const c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}
