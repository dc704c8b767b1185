//! Sample page snapshots for testing and demonstration.
//!
//! Each page holds a `#resume-preview` element the way the editor renders
//! it, affordances included.

/// Legacy renderer, 35/65 sidebar layout scaled to fit the viewport.
///
/// The content root has 28px horizontal padding per side and the column row
/// a 24px gap, so on an A4 page the usable row width is 714px. The sidebar
/// holds two blank contact rows, an empty skill and an add button;
/// the main column a placeholder bullet, a delete control and a hover-only
/// toolbar.
pub fn legacy_sidebar_page() -> &'static str {
    r##"<!DOCTYPE html>
<html>
<head>
    <title>Resume editor</title>
    <style>.resume-name { letter-spacing: 0.02em; }</style>
</head>
<body>
<div class="editor-shell">
    <div id="resume-preview" class="overflow-auto">
        <div class="max-w-[210mm] mx-auto bg-white shadow-lg px-7 py-8" style="transform: scale(0.85); transform-origin: top center">
            <div class="flex gap-6">
                <aside class="w-[35%] bg-slate-100 p-4">
                    <h1 class="resume-name text-2xl font-bold">Jane Doe</h1>
                    <div class="flex items-center gap-2"><svg class="lucide-mail" width="14" height="14"></svg><span>jane@example.com</span></div>
                    <div class="flex items-center gap-2"><svg class="lucide-phone" width="14" height="14"></svg><span>Click to edit</span></div>
                    <a class="flex items-center gap-2" href="https://"><svg class="lucide-linkedin" width="14" height="14"></svg><span>LinkedIn</span></a>
                    <h3 class="mt-4 font-semibold">Skills</h3>
                    <ul class="flex flex-wrap gap-1">
                        <li class="skill-tag">Rust</li>
                        <li class="skill-tag">TypeScript</li>
                        <li class="skill-tag"></li>
                    </ul>
                    <button class="add-button">+ Add Skill</button>
                </aside>
                <main class="w-[65%]">
                    <section data-section="experience" class="group">
                        <div class="flex justify-between">
                            <h3 class="font-semibold">Senior Engineer, Acme</h3>
                            <span class="text-sm">2020 - Present</span>
                        </div>
                        <ul class="list-disc pl-5">
                            <li>Rebuilt the document export pipeline end to end</li>
                            <li>Click to add a bullet point</li>
                        </ul>
                        <button aria-label="Delete item" class="opacity-0 group-hover:opacity-100"><svg class="lucide-trash-2" width="14" height="14"></svg></button>
                        <div class="opacity-0 group-hover:opacity-100 flex gap-1"><span>Move up</span><span>Move down</span></div>
                    </section>
                </main>
            </div>
        </div>
    </div>
</div>
</body>
</html>
"##
}

/// Composable (`resume-v2`) renderer with a colored sidebar of 32% and a
/// percentage gap.
pub fn composable_two_column_page() -> &'static str {
    r##"<!DOCTYPE html>
<html>
<head>
    <link rel="stylesheet" href="https://fonts.example.com/inter.css">
    <style>.resume-v2 { font-family: Inter, sans-serif; }</style>
</head>
<body>
<div id="resume-preview">
    <div class="resume-v2" style="padding: 32px; transform: scale(0.9)">
        <header data-section="header" class="flex justify-between">
            <h1>Sam Lee</h1>
            <div class="flex items-center gap-2"><svg class="lucide-globe"></svg><a href="www.samlee.dev">www.samlee.dev</a></div>
        </header>
        <div style="display: flex; gap: 3%">
            <div data-column="sidebar" style="width: 32%; background-color: #f1f5f9; padding: 16px">
                <section data-section="skills">
                    <h2>Skills</h2>
                    <ul><li>Distributed systems</li><li>Golang</li><li>Click to add skill</li></ul>
                    <div data-add-button="skills">Add skill</div>
                </section>
            </div>
            <div class="flex-1">
                <section data-section="experience">
                    <h2>Experience</h2>
                    <p>Staff engineer building a long-hostname-like-token-without-any-breaks-anywhere-in-it service.</p>
                    <span data-action="delete" role="button">x</span>
                </section>
            </div>
        </div>
    </div>
</div>
</body>
</html>
"##
}

/// Legacy single-column page: a photo header and title/date rows, none of
/// which are page columns.
pub fn scaled_single_column_page() -> &'static str {
    r##"<!DOCTYPE html>
<html>
<body>
<div id="resume-preview">
    <div class="max-w-[210mm] bg-white p-10" style="transform: scale(0.75) translateX(-10px); transform-origin: top left">
        <div class="flex gap-4">
            <div class="w-24"><img src="data:image/png;base64,iVBORw0KGgo=" alt="photo"></div>
            <div class="flex-1"><h1>Alex Kim</h1><p>Product Designer</p></div>
        </div>
        <section data-section="education">
            <div class="flex justify-between"><h3>BSc Design</h3><span>2014 - 2018</span></div>
        </section>
    </div>
</div>
</body>
</html>
"##
}

/// All samples with a short name, for tests and demos.
pub fn samples() -> [(&'static str, &'static str); 3] {
    [
        ("legacy-sidebar", legacy_sidebar_page()),
        ("composable-two-column", composable_two_column_page()),
        ("single-column", scaled_single_column_page()),
    ]
}
