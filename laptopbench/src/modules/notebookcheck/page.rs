//! Extraction of device identity and scores from a fetched benchmark page.

use std::collections::HashMap;

use anyhow::Context;
use kuchiki::traits::TendrilSink;
use kuchiki::NodeRef;

/// Everything a single device page yields: the device's precise name, its
/// benchmark scores, and - on CPU pages - the URL of the integrated GPU's
/// own page, when the site publishes one.
#[derive(Debug, Clone, PartialEq)]
pub struct DevicePage {
    pub name: String,
    pub benchmarks: HashMap<String, f64>,
    pub integrated_gpu_url: Option<String>,
}

pub fn parse_device_page(html: &str) -> anyhow::Result<DevicePage> {
    let document = clean_document(html);

    let name = document
        .select_first("#content h1")
        .or_else(|_| document.select_first("h1"))
        .ok()
        .map(|heading| heading.text_contents().trim().to_string())
        .context("device page has no heading")?;

    Ok(DevicePage {
        name,
        benchmarks: parse_benchmarks(&document),
        integrated_gpu_url: integrated_gpu_url(&document),
    })
}

/// The site's pages contain unclosed tags; html5ever normalizes those for us.
/// Script and style subtrees are dropped so their contents can't leak into
/// the scraped text.
fn clean_document(html: &str) -> NodeRef {
    let document = kuchiki::parse_html().one(html);
    if let Ok(nodes) = document.select("script, style") {
        let nodes: Vec<_> = nodes.collect();
        for node in nodes {
            node.as_node().detach();
        }
    }
    document
}

fn first_text_child(node: &NodeRef) -> Option<String> {
    node.children().find_map(|child| {
        let text = child.as_text()?.borrow().to_string();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    })
}

/// Each benchmark block holds a title div (`<b>series</b> - name`) and a
/// score legend. The same `gpubench_div` class is used on CPU pages too -
/// confusing, but that is how the site is built.
fn parse_benchmarks(document: &NodeRef) -> HashMap<String, f64> {
    let mut benchmarks = HashMap::new();
    let blocks = match document.select("div.gpubench_div") {
        Ok(blocks) => blocks,
        Err(()) => return benchmarks,
    };
    for block in blocks {
        let node = block.as_node();

        let title_div = match node.children().find(|child| child.as_element().is_some()) {
            Some(div) => div,
            None => continue,
        };
        // the series prefix sits inside the <b> tag, so the first bare text
        // node already excludes it; it still starts with the " - " separator
        let raw_name = match first_text_child(&title_div) {
            Some(text) => text,
            None => continue,
        };
        // the text node may carry leading whitespace (newlines, indentation)
        // before the " - " separator
        let name = raw_name.trim_start();
        let name = name.strip_prefix("- ").unwrap_or(name).trim();
        // some benchmark names end with a '*' marker
        let name = name.strip_suffix('*').unwrap_or(name).trim().to_string();

        let score_text = match node.select_first("div.paintAB_legend > span") {
            Ok(span) => span.text_contents(),
            Err(()) => continue,
        };
        // the score may be followed by units or a percent sign
        let score = match score_text.trim().split(' ').next().and_then(|s| s.parse::<f64>().ok()) {
            Some(score) => score,
            None => continue,
        };

        benchmarks.insert(name, score);
    }
    benchmarks
}

/// CPU pages carry an info table; the row labelled exactly `GPU` links to the
/// page of the CPU's integrated GPU. Returns `None` when the row or its link
/// is absent.
fn integrated_gpu_url(document: &NodeRef) -> Option<String> {
    let rows = document.select(".gputable tr").ok()?;
    for row in rows {
        let cells: Vec<_> = match row.as_node().select("td") {
            Ok(cells) => cells.collect(),
            Err(()) => continue,
        };
        if cells.len() < 2 || cells[0].text_contents().trim() != "GPU" {
            continue;
        }
        // the value cell is usually an <a> with the url; some CPUs have a
        // GPU row without any link at all
        return cells[1].as_node().select_first("a").ok().and_then(|anchor| {
            let attributes = anchor.attributes.borrow();
            attributes.get("href").map(|href| href.to_string())
        });
    }
    None
}

/// Pulls the canonical device-page URL out of a search results page: the
/// first anchor in the second "specs" cell of the results table. `None`
/// means the search found nothing.
pub(crate) fn parse_search_results(html: &str) -> Option<String> {
    let document = kuchiki::parse_html().one(html);
    let anchor = document.select_first("td.specs:nth-child(2) > a").ok()?;
    let attributes = anchor.attributes.borrow();
    attributes.get("href").map(|href| href.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEVICE_PAGE: &str = r#"
        <html>
            <head><style>.gpubench_div { color: red; }</style></head>
            <body>
                <script>var benchmarks = "Fake 9000";</script>
                <div id="content">
                    <div><div><h1>Intel Core i7-10750H</h1></div></div>
                    <table class="gputable">
                        <tbody>
                            <tr><td>Codename</td><td>Comet Lake-H</td></tr>
                            <tr><td>GPU</td><td><a href="https://www.notebookcheck.net/Intel-UHD-Graphics-630.html">Intel UHD Graphics 630</a></td></tr>
                        </tbody>
                    </table>
                    <div class="gpubench_div">
                        <div><b>Cinebench R15</b> - CPU Multi 64Bit</div>
                        <div><div class="paintAB_legend"><span>1352 Points</span></div></div>
                    </div>
                    <div class="gpubench_div">
                        <div><b>WinRAR</b> - WinRAR 4.0*</div>
                        <div><div class="paintAB_legend"><span>5457</span></div></div>
                    </div>
                    <div class="gpubench_div">
                        <div><b>Broken</b> - No Score</div>
                        <div><div class="paintAB_legend"><span>n/a</span></div></div>
                    </div>
                <!-- unclosed div: the site really does ship html like this
            </body>
        </html>
    "#;

    #[test]
    fn test_parse_device_page() {
        let page = parse_device_page(DEVICE_PAGE).unwrap();
        assert_eq!(page.name, "Intel Core i7-10750H");
        assert_eq!(page.benchmarks.len(), 2);
        assert_eq!(page.benchmarks["CPU Multi 64Bit"], 1352.0);
        assert_eq!(page.benchmarks["WinRAR 4.0"], 5457.0);
        assert_eq!(
            page.integrated_gpu_url.as_deref(),
            Some("https://www.notebookcheck.net/Intel-UHD-Graphics-630.html")
        );
    }

    #[test]
    fn test_script_text_does_not_leak() {
        let page = parse_device_page(DEVICE_PAGE).unwrap();
        assert!(page.benchmarks.keys().all(|name| !name.contains("Fake")));
    }

    #[test]
    fn test_benchmark_name_with_leading_whitespace() {
        // pretty-printed markup puts a newline between the <b> tag and the
        // separator; the name must come out clean anyway
        let html = "<html><body>\n\
            <h1>AMD Ryzen 7 5800H</h1>\n\
            <div class=\"gpubench_div\">\n\
                <div><b>PCMark 10</b>\n                    - Score</div>\n\
                <div><div class=\"paintAB_legend\"><span>6712 Points</span></div></div>\n\
            </div>\n\
        </body></html>";
        let page = parse_device_page(html).unwrap();
        assert_eq!(page.benchmarks["Score"], 6712.0);
    }

    #[test]
    fn test_gpu_row_without_link() {
        let html = r#"
            <html><body>
                <h1>Some CPU 1234</h1>
                <table class="gputable"><tbody>
                    <tr><td>GPU</td><td>none announced</td></tr>
                </tbody></table>
            </body></html>
        "#;
        let page = parse_device_page(html).unwrap();
        assert_eq!(page.integrated_gpu_url, None);
    }

    #[test]
    fn test_page_without_gpu_row() {
        let html = r#"
            <html><body>
                <h1>NVIDIA GeForce RTX 3060</h1>
                <table class="gputable"><tbody>
                    <tr><td>Codename</td><td>GA106</td></tr>
                </tbody></table>
            </body></html>
        "#;
        let page = parse_device_page(html).unwrap();
        assert_eq!(page.integrated_gpu_url, None);
    }

    #[test]
    fn test_page_without_heading() {
        assert!(parse_device_page("<html><body></body></html>").is_err());
    }

    #[test]
    fn test_parse_search_results() {
        let html = r#"
            <html><body><table>
                <tr>
                    <td class="specs">1</td>
                    <td class="specs"><a href="https://www.notebookcheck.net/Intel-Core-i7-10750H.html">Intel Core i7-10750H</a></td>
                    <td class="specs"><a href="https://example.com/wrong">other</a></td>
                </tr>
            </table></body></html>
        "#;
        assert_eq!(
            parse_search_results(html).as_deref(),
            Some("https://www.notebookcheck.net/Intel-Core-i7-10750H.html")
        );
    }

    #[test]
    fn test_parse_search_results_empty() {
        let html = "<html><body><table><tr><td>No results.</td></tr></table></body></html>";
        assert_eq!(parse_search_results(html), None);
    }
}
