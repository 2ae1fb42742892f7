use super::document::{BigNumber, Block, DataTable, Document, Group};
use maud::{html, Markup, PreEscaped, DOCTYPE};

const VEGA: &str = "https://cdn.jsdelivr.net/npm/vega@5";
const VEGA_LITE: &str = "https://cdn.jsdelivr.net/npm/vega-lite@5";
const VEGA_EMBED: &str = "https://cdn.jsdelivr.net/npm/vega-embed@6";

const STYLE: &str = r#"
body { font-family: -apple-system, "Segoe UI", Helvetica, Arial, sans-serif; margin: 0; color: #1f2328; background: #f6f8fa; }
header { background: #24292f; color: #fff; padding: 1rem 2rem; }
header h1 { margin: 0 0 .5rem 0; font-size: 1.4rem; }
nav button { background: none; border: 0; color: #d0d7de; padding: .4rem .8rem; cursor: pointer; font-size: 1rem; }
nav button.active { color: #fff; border-bottom: 2px solid #fd8c73; }
main { padding: 1.5rem 2rem; }
.page { display: none; }
.page.active { display: block; }
.group { display: grid; gap: 1rem; margin: 1rem 0; }
.big-number { background: #fff; border: 1px solid #d0d7de; border-radius: 6px; padding: .8rem 1rem; }
.big-number .heading { color: #57606a; font-size: .85rem; }
.big-number .value { font-size: 1.8rem; font-weight: 600; }
.big-number .change.up { color: #1a7f37; }
.big-number .change.down { color: #cf222e; }
.chart { background: #fff; border: 1px solid #d0d7de; border-radius: 6px; padding: .5rem; min-height: 300px; }
table { border-collapse: collapse; background: #fff; width: 100%; font-size: .9rem; }
th, td { border: 1px solid #d0d7de; padding: .3rem .6rem; text-align: left; vertical-align: top; }
th { background: #eaeef2; }
caption { caption-side: bottom; color: #57606a; padding: .4rem; }
hr { border: 0; border-top: 1px solid #d0d7de; margin: 1.5rem 0; }
img { max-width: 160px; border-radius: 50%; }
select { font-size: 1rem; padding: .3rem; margin: .5rem 0; }
.option { display: none; }
.option.active { display: block; }
"#;

const SCRIPT: &str = r#"
function showPage(i) {
  document.querySelectorAll('.page').forEach(function (p, j) { p.classList.toggle('active', i === j); });
  document.querySelectorAll('nav button').forEach(function (b, j) { b.classList.toggle('active', i === j); });
}
document.querySelectorAll('nav button').forEach(function (b, i) { b.addEventListener('click', function () { showPage(i); }); });
document.querySelectorAll('select[data-select]').forEach(function (s) {
  s.addEventListener('change', function () {
    document.querySelectorAll('#' + s.dataset.select + ' > .option').forEach(function (o, j) {
      o.classList.toggle('active', String(j) === s.value);
    });
  });
});
CHARTS.forEach(function (c) { vegaEmbed('#' + c[0], c[1], { actions: false }); });
showPage(0);
"#;

/// Renders `document` as a single HTML page. Charts load vega-embed from a CDN.
pub fn render_html(document: &Document) -> String {
    Renderer::default().document(document).into_string()
}

#[derive(Default)]
struct Renderer {
    charts: Vec<(String, String)>,
    selects: usize,
}

impl Renderer {
    fn document(&mut self, doc: &Document) -> Markup {
        let pages: Vec<Markup> = doc
            .pages
            .iter()
            .map(|page| {
                let blocks: Vec<Markup> = page.blocks.iter().map(|b| self.block(b)).collect();
                html! {
                    section class="page" {
                        @for block in &blocks { (block) }
                    }
                }
            })
            .collect();

        html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="utf-8";
                    meta name="viewport" content="width=device-width, initial-scale=1";
                    title { (doc.title) }
                    script src=(VEGA) {}
                    script src=(VEGA_LITE) {}
                    script src=(VEGA_EMBED) {}
                    style { (PreEscaped(STYLE)) }
                }
                body {
                    header {
                        h1 { (doc.title) }
                        nav {
                            @for page in &doc.pages {
                                button type="button" { (page.title) }
                            }
                        }
                    }
                    main {
                        @for page in &pages { (page) }
                    }
                    script { (PreEscaped(self.chart_script())) }
                }
            }
        }
    }

    fn chart_script(&self) -> String {
        let mut script = String::from("\nconst CHARTS = [\n");
        for (id, spec) in &self.charts {
            script.push_str(&format!("  [\"{id}\", {}],\n", script_safe(spec)));
        }
        script.push_str("];\n");
        script.push_str(SCRIPT);
        script
    }

    fn block(&mut self, block: &Block) -> Markup {
        match block {
            Block::Text(markdown) => markdown_to_html(markdown),
            Block::BigNumber(n) => big_number(n),
            Block::Group(g) => self.group(g),
            Block::Select(groups) => self.select(groups),
            Block::Divider => html! { hr; },
            Block::Chart(chart) => {
                let id = format!("chart-{}", self.charts.len());
                self.charts.push((id.clone(), chart.to_json()));
                html! { div.chart id=(id) {} }
            }
            Block::DataTable(t) => table(t),
        }
    }

    fn group(&mut self, g: &Group) -> Markup {
        let cells: Vec<Markup> = g.blocks.iter().map(|b| self.block(b)).collect();
        html! {
            div.group style=(format!("grid-template-columns: repeat({}, minmax(0, 1fr));", g.columns)) {
                @for cell in &cells {
                    div { (cell) }
                }
            }
        }
    }

    fn select(&mut self, groups: &[Group]) -> Markup {
        let id = format!("select-{}", self.selects);
        self.selects += 1;
        let options: Vec<Markup> = groups.iter().map(|g| self.group(g)).collect();

        html! {
            select data-select=(id) {
                @for (i, g) in groups.iter().enumerate() {
                    option value=(i) {
                        @match &g.label {
                            Some(label) => { (label) }
                            None => { "Option " (i + 1) }
                        }
                    }
                }
            }
            div id=(id) {
                @for (i, option) in options.iter().enumerate() {
                    div class=(if i == 0 { "option active" } else { "option" }) { (option) }
                }
            }
        }
    }
}

fn big_number(n: &BigNumber) -> Markup {
    let (class, arrow) = match n.is_upward_change {
        Some(false) => ("change down", "▼"),
        _ => ("change up", "▲"),
    };
    html! {
        div.big-number {
            div.heading { (n.heading) }
            div.value { (n.value) }
            @if let Some(change) = &n.change {
                div class=(class) {
                    (arrow) " " (change)
                    @if let Some(prev) = &n.prev_value {
                        " (from " (prev) ")"
                    }
                }
            }
            @if let Some(label) = &n.label {
                div.heading { (label) }
            }
        }
    }
}

fn table(t: &DataTable) -> Markup {
    html! {
        table {
            @if let Some(caption) = &t.caption {
                caption { (caption) }
            }
            thead {
                tr {
                    @for col in &t.columns { th { (col) } }
                }
            }
            tbody {
                @for row in &t.rows {
                    tr {
                        @for cell in row { td { (cell) } }
                    }
                }
            }
        }
    }
}

/// JSON embedded in a `<script>` must not contain a literal `</`.
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
}

/// Block-level pass: `#` headings, `![](url)` image lines, blank-line separated paragraphs.
pub fn markdown_to_html(markdown: &str) -> Markup {
    let mut blocks: Vec<Markup> = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();

    fn flush(blocks: &mut Vec<Markup>, paragraph: &mut Vec<&str>) {
        if !paragraph.is_empty() {
            blocks.push(html! { p { (inline(&paragraph.join(" "))) } });
            paragraph.clear();
        }
    }

    for line in markdown.lines().map(str::trim) {
        if line.is_empty() {
            flush(&mut blocks, &mut paragraph);
        } else if line.starts_with('#') {
            flush(&mut blocks, &mut paragraph);
            let level = line.chars().take_while(|&c| c == '#').count().min(6);
            blocks.push(heading(level, inline(line[level..].trim())));
        } else if let Some(url) = line.strip_prefix("![](").and_then(|l| l.strip_suffix(')')) {
            flush(&mut blocks, &mut paragraph);
            blocks.push(html! { p { img src=(url) alt=""; } });
        } else {
            paragraph.push(line);
        }
    }
    flush(&mut blocks, &mut paragraph);

    html! { @for block in &blocks { (block) } }
}

fn heading(level: usize, content: Markup) -> Markup {
    match level {
        1 => html! { h1 { (content) } },
        2 => html! { h2 { (content) } },
        3 => html! { h3 { (content) } },
        4 => html! { h4 { (content) } },
        5 => html! { h5 { (content) } },
        _ => html! { h6 { (content) } },
    }
}

/// Backslash-escapes the characters [`markdown_to_html`] treats as markup, so
/// `value` renders literally when interpolated into a text block.
pub fn markdown_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '*' | '#' | '!') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// `**bold**`, `*italic*` and `\` escapes; unterminated markers are closed at the end.
fn inline(text: &str) -> Markup {
    let mut out = String::with_capacity(text.len());
    let mut run = String::new();
    let mut bold = false;
    let mut italic = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => run.push(chars.next().unwrap_or('\\')),
            '*' => {
                out.push_str(&html! { (run) }.into_string());
                run.clear();
                if chars.peek() == Some(&'*') {
                    chars.next();
                    out.push_str(if bold { "</strong>" } else { "<strong>" });
                    bold = !bold;
                } else {
                    out.push_str(if italic { "</em>" } else { "<em>" });
                    italic = !italic;
                }
            }
            _ => run.push(c),
        }
    }
    out.push_str(&html! { (run) }.into_string());
    if italic {
        out.push_str("</em>");
    }
    if bold {
        out.push_str("</strong>");
    }
    PreEscaped(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::chart::bar_chart;
    use crate::report::document::{group, text, Page};

    #[test]
    fn markdown_headings_emphasis_and_images() {
        let html = markdown_to_html("# Title\nSome **bold** and *it* <b>\n\n![](https://x/a.png)").into_string();
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<p>Some <strong>bold</strong> and <em>it</em> &lt;b&gt;</p>"));
        assert!(html.contains("<img src=\"https://x/a.png\""));
    }

    #[test]
    fn unterminated_emphasis_is_closed() {
        assert_eq!(inline("**open").into_string(), "<strong>open</strong>");
    }

    #[test]
    fn escaped_values_render_literally() {
        let bio = markdown_literal("Fan of C* and *nix");
        let html = markdown_to_html(&format!("**bio**: {bio}")).into_string();
        assert_eq!(html, "<p><strong>bio</strong>: Fan of C* and *nix</p>");

        let heading_like = markdown_to_html(&markdown_literal("# not a heading\n![](x)")).into_string();
        assert!(!heading_like.contains("<h1>"));
        assert!(!heading_like.contains("<img"));
        assert!(heading_like.contains("# not a heading"));
    }

    #[test]
    fn renders_pages_charts_and_tables() {
        let doc = Document::new(
            "Dash <1>",
            vec![
                Page::new("One", vec![text("hello"), group(vec![Block::Chart(bar_chart(&[], "a", "b"))], 2)]),
                Page::new(
                    "Two",
                    vec![Block::DataTable(DataTable {
                        caption: Some("cap".into()),
                        columns: vec!["c".into()],
                        rows: vec![vec!["</script>".into()]],
                    })],
                ),
            ],
        );
        let html = render_html(&doc);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Dash &lt;1&gt;</title>"));
        assert_eq!(html.matches("<section class=\"page\">").count(), 2);
        assert!(html.contains("id=\"chart-0\""));
        assert!(html.contains("[\"chart-0\", {"));
        assert!(html.contains("<td>&lt;/script&gt;</td>"));
        assert!(html.contains("repeat(2, minmax(0, 1fr))"));
    }

    #[test]
    fn select_renders_one_option_per_group() {
        let groups = vec![
            Group::new(vec![text("a")], 3).labeled("org/a"),
            Group::new(vec![text("b")], 3).labeled("org/b"),
        ];
        let html = render_html(&Document::single("s", vec![Block::Select(groups)]));
        assert!(html.contains("<option value=\"0\">org/a</option><option value=\"1\">org/b</option>"));
        assert_eq!(html.matches("class=\"option active\"").count(), 1);
    }
}
