//! Laptop collection from the ivory.co.il catalog.

use std::collections::HashMap;

use async_trait::async_trait;
use kuchiki::traits::TendrilSink;
use lazy_static::lazy_static;
use maplit::hashmap;
use tracing::warn;

use crate::common::{parse_grouped_number, Client, LaptopSource};
use crate::modules::notebookcheck::device_id::detect_laptop_device_ids;
use crate::schemas::laptop::{Laptop, RawLaptop};

const CATALOG_URL: &str = "https://www.ivory.co.il/catalog.php?act=cat&id=2590&pg=";
const ITEM_URL: &str = "https://www.ivory.co.il/catalog.php?id=";

lazy_static! {
    static ref RAM_RE: regex::Regex = regex::Regex::new(r"([0-9]+)GB").unwrap();
    static ref WEIGHT_RE: regex::Regex = regex::Regex::new(r"[0-9]+(?:\.[0-9]+)?").unwrap();

    /// Spec-table labels (the site is in Hebrew) mapped to record fields.
    static ref FIELD_LABELS: HashMap<&'static str, &'static str> = hashmap! {
        "יצרן" => "brand",
        "דגם" => "model",
        "מעבד" => "cpu",
        "כרטיס מסך" => "gpu",
        "זיכרון פנימי" => "ram",
        "משקל" => "weight",
    };
}

pub struct Ivory {
    client: Client<false>,
    pages: u32,
}

impl Ivory {
    pub fn new(pages: u32) -> Self {
        Self {
            client: Client::default(),
            pages,
        }
    }
}

#[async_trait]
impl LaptopSource for Ivory {
    async fn collect(&self) -> anyhow::Result<Vec<Laptop>> {
        let mut item_ids: Vec<String> = Vec::new();
        for page in 0..self.pages {
            let html = self
                .client
                .0
                .get(format!("{}{}", CATALOG_URL, page))
                .send()
                .await?
                .text()
                .await?;
            for id in parse_catalog_page(&html) {
                if !item_ids.contains(&id) {
                    item_ids.push(id);
                }
            }
        }

        let mut laptops = Vec::new();
        for id in item_ids {
            let url = format!("{}{}", ITEM_URL, id);
            let html = self.client.0.get(&url).send().await?.text().await?;
            match parse_laptop_page(&html, &url) {
                Some(raw) => laptops.push(detect_laptop_device_ids(raw)),
                None => warn!("failed to parse laptop page {}", url),
            }
        }
        Ok(laptops)
    }
}

/// Collects the product ids linked from one catalog page.
pub(crate) fn parse_catalog_page(html: &str) -> Vec<String> {
    let document = kuchiki::parse_html().one(html);
    let mut ids = Vec::new();
    if let Ok(anchors) = document.select("a[data-product-id]") {
        for anchor in anchors {
            let attributes = anchor.attributes.borrow();
            if let Some(id) = attributes.get("data-product-id") {
                let id = id.to_string();
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
    }
    ids
}

/// Parses one laptop page into a [`RawLaptop`]. Returns `None` - dropping
/// the laptop - when the cpu, price, ram or weight can't be extracted.
pub(crate) fn parse_laptop_page(html: &str, url: &str) -> Option<RawLaptop> {
    let document = kuchiki::parse_html().one(html);

    let mut fields: HashMap<&'static str, String> = HashMap::new();
    if let Ok(rows) = document.select(".table-specs tr") {
        for row in rows {
            let cells: Vec<_> = match row.as_node().select("td") {
                Ok(cells) => cells.collect(),
                Err(()) => continue,
            };
            if cells.len() < 2 {
                continue;
            }
            let label = cells[0].text_contents().trim().to_string();
            if let Some(&field) = FIELD_LABELS.get(label.as_str()) {
                fields.insert(field, cells[1].text_contents().trim().to_string());
            }
        }
    }

    // the price attribute is more reliable than the visible price text,
    // which changes its markup during discounts
    let price = document
        .select_first("#pricetotalitemjs")
        .ok()
        .and_then(|el| {
            let attributes = el.attributes.borrow();
            attributes.get("data-price").map(str::to_string)
        })
        .and_then(parse_grouped_number)?;

    let cpu = fields.remove("cpu")?;
    let ram = fields
        .remove("ram")
        .and_then(|text| RAM_RE.captures(&text)?.get(1)?.as_str().parse::<u32>().ok())?;
    let weight = fields
        .remove("weight")
        .and_then(|text| WEIGHT_RE.find(&text)?.as_str().parse::<f64>().ok())?;

    Some(RawLaptop {
        url: url.to_string(),
        brand: fields.remove("brand"),
        model: fields.remove("model"),
        price: Some(price),
        ram: Some(ram),
        weight: Some(weight),
        cpu,
        gpu: fields.remove("gpu"),
        // the ivory pages carry no scrapeable image gallery
        image_urls: vec![],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAPTOP_PAGE: &str = r#"
        <html><body>
            <span id="pricetotalitemjs" data-price="4,390"></span>
            <table class="table-specs">
                <tr><td>יצרן</td><td>Lenovo</td></tr>
                <tr><td>דגם</td><td>Legion 5</td></tr>
                <tr><td>מעבד</td><td>AMD Ryzen 7 5800H</td></tr>
                <tr><td>כרטיס מסך</td><td>NVIDIA GeForce RTX 3060 6GB</td></tr>
                <tr><td>זיכרון פנימי</td><td>16GB DDR4</td></tr>
                <tr><td>משקל</td><td>2.4 ק"ג</td></tr>
                <tr><td>אחריות</td><td>שנה</td></tr>
            </table>
        </body></html>
    "#;

    #[test]
    fn test_parse_laptop_page() {
        let raw = parse_laptop_page(LAPTOP_PAGE, "https://www.ivory.co.il/catalog.php?id=1").unwrap();
        assert_eq!(raw.brand.as_deref(), Some("Lenovo"));
        assert_eq!(raw.model.as_deref(), Some("Legion 5"));
        assert_eq!(raw.price, Some(4390.0));
        assert_eq!(raw.ram, Some(16));
        assert_eq!(raw.weight, Some(2.4));
        assert_eq!(raw.cpu, "AMD Ryzen 7 5800H");
        assert_eq!(raw.gpu.as_deref(), Some("NVIDIA GeForce RTX 3060 6GB"));
    }

    #[test]
    fn test_parse_laptop_page_feeds_device_detection() {
        let raw = parse_laptop_page(LAPTOP_PAGE, "https://www.ivory.co.il/catalog.php?id=1").unwrap();
        let laptop = detect_laptop_device_ids(raw);
        assert_eq!(laptop.cpu, "AMD Ryzen 7 5800H");
        // the vram suffix is not part of the canonical id
        assert_eq!(laptop.gpu.as_deref(), Some("NVIDIA GeForce RTX 3060"));
        assert!(!laptop.integrated);
    }

    #[test]
    fn test_parse_laptop_page_missing_ram_is_dropped() {
        let html = r#"
            <html><body>
                <span id="pricetotalitemjs" data-price="4,390"></span>
                <table class="table-specs">
                    <tr><td>מעבד</td><td>AMD Ryzen 7 5800H</td></tr>
                    <tr><td>משקל</td><td>2.4</td></tr>
                </table>
            </body></html>
        "#;
        assert!(parse_laptop_page(html, "https://example.com").is_none());
    }

    #[test]
    fn test_parse_laptop_page_missing_price_is_dropped() {
        let html = r#"
            <html><body>
                <table class="table-specs">
                    <tr><td>מעבד</td><td>AMD Ryzen 7 5800H</td></tr>
                    <tr><td>זיכרון פנימי</td><td>16GB</td></tr>
                    <tr><td>משקל</td><td>2.4</td></tr>
                </table>
            </body></html>
        "#;
        assert!(parse_laptop_page(html, "https://example.com").is_none());
    }

    #[test]
    fn test_parse_catalog_page() {
        let html = r#"
            <html><body>
                <a data-product-id="1001" href="/catalog.php?id=1001">a</a>
                <a data-product-id="1002" href="/catalog.php?id=1002">b</a>
                <a data-product-id="1001" href="/catalog.php?id=1001">dup</a>
                <a href="/other">no id</a>
            </body></html>
        "#;
        assert_eq!(parse_catalog_page(html), vec!["1001", "1002"]);
    }
}
