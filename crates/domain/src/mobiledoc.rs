//! Helpers over Ghost's mobiledoc JSON.
//!
//! A card is a two element array `[name, payload]`; sections reference cards
//! by index with `[10, index]`.

use scraper::Html;
use serde_json::{json, Value};

pub const VERSION: &str = "0.3.1";
const CARD_SECTION: u64 = 10;

pub fn parse(raw: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(raw)
}

pub fn cards(doc: &Value) -> impl Iterator<Item = (&str, &Value)> {
    doc.get("cards")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|card| {
            let name = card.get(0)?.as_str()?;
            let payload = card.get(1)?;
            Some((name, payload))
        })
}

/// 文档是否已经包含预览卡片
pub fn has_preview_cards(doc: &Value) -> bool {
    cards(doc).any(|(name, _)| name == "bookmark" || name == "embed")
}

pub fn has_image_cards(doc: &Value) -> bool {
    cards(doc).any(|(name, _)| name == "image" || name == "gallery")
}

/// 组装只包含卡片的文档，section 顺序与 cards 一致
pub fn document_from_cards(cards: Vec<Value>) -> Value {
    let sections: Vec<Value> = (0..cards.len())
        .map(|i| json!([CARD_SECTION, i]))
        .collect();
    json!({
        "version": VERSION,
        "atoms": [],
        "cards": cards,
        "markups": [],
        "sections": sections,
    })
}

/// Fills empty `alt`/`title` on image and gallery cards.
///
/// Returns how many images were touched.
pub fn assign_img_alt(doc: &mut Value, post_title: &str) -> usize {
    let Some(cards) = doc.get_mut("cards").and_then(Value::as_array_mut) else {
        return 0;
    };

    let mut changed = 0;
    for card in cards.iter_mut() {
        let name = card.get(0).and_then(Value::as_str).unwrap_or_default();
        match name {
            "image" => {
                if let Some(payload) = card.get_mut(1) {
                    changed += fill_image(payload, post_title) as usize;
                }
            }
            "gallery" => {
                let images = card
                    .get_mut(1)
                    .and_then(|p| p.get_mut("images"))
                    .and_then(Value::as_array_mut);
                if let Some(images) = images {
                    for image in images.iter_mut() {
                        changed += fill_image(image, post_title) as usize;
                    }
                }
            }
            _ => {}
        }
    }
    changed
}

fn fill_image(image: &mut Value, post_title: &str) -> bool {
    let Some(obj) = image.as_object_mut() else {
        return false;
    };

    let is_blank = |v: Option<&Value>| v.and_then(Value::as_str).map_or(true, |s| s.trim().is_empty());
    let missing_alt = is_blank(obj.get("alt"));
    let missing_title = is_blank(obj.get("title"));
    if !missing_alt && !missing_title {
        return false;
    }

    let caption = obj.get("caption").and_then(Value::as_str);
    let src = obj.get("src").and_then(Value::as_str).unwrap_or_default();
    let text = alt_text_for(caption, src, post_title);

    if missing_alt {
        obj.insert("alt".into(), Value::String(text.clone()));
    }
    if missing_title {
        obj.insert("title".into(), Value::String(text));
    }
    true
}

/// caption 优先，其次是文件名，最后退回文章标题
pub fn alt_text_for(caption: Option<&str>, src: &str, post_title: &str) -> String {
    if let Some(caption) = caption.map(strip_tags).filter(|c| !c.is_empty()) {
        return caption;
    }
    humanize_file_stem(src).unwrap_or_else(|| post_title.to_string())
}

fn strip_tags(fragment: &str) -> String {
    let text: String = Html::parse_fragment(fragment).root_element().text().collect();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn humanize_file_stem(src: &str) -> Option<String> {
    let path = src.split(['?', '#']).next()?;
    let file = path.rsplit('/').next()?;
    let stem = file.rsplit_once('.').map_or(file, |(stem, _)| stem);

    let words: Vec<&str> = stem
        .split(['-', '_', ' '])
        .filter(|w| !w.is_empty())
        .collect();
    if words.is_empty() || words.iter().all(|w| w.chars().all(|c| c.is_ascii_digit())) {
        return None;
    }

    let joined = words.join(" ");
    let mut chars = joined.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().chain(chars).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_missing_alt_from_file_name() {
        let mut doc = json!({
            "version": VERSION,
            "cards": [
                ["image", { "src": "https://cdn.site/2020/05/data-pipeline_diagram.png", "alt": "", "caption": "" }],
                ["markdown", { "markdown": "hi" }]
            ]
        });

        assert_eq!(assign_img_alt(&mut doc, "Post"), 1);
        assert_eq!(doc["cards"][0][1]["alt"], "Data pipeline diagram");
        assert_eq!(doc["cards"][0][1]["title"], "Data pipeline diagram");
    }

    #[test]
    fn caption_wins_and_existing_alt_is_kept() {
        let mut doc = json!({
            "cards": [
                ["image", { "src": "x.png", "caption": "<em>Our</em> results" }],
                ["image", { "src": "y.png", "alt": "Keep me", "title": "Keep me" }]
            ]
        });

        assert_eq!(assign_img_alt(&mut doc, "Post"), 1);
        assert_eq!(doc["cards"][0][1]["alt"], "Our results");
        assert_eq!(doc["cards"][1][1]["alt"], "Keep me");
    }

    #[test]
    fn gallery_images_fall_back_to_post_title() {
        let mut doc = json!({
            "cards": [["gallery", { "images": [{ "src": "https://cdn/1234.jpg" }] }]]
        });

        assert_eq!(assign_img_alt(&mut doc, "Weekly Roundup"), 1);
        assert_eq!(doc["cards"][0][1]["images"][0]["alt"], "Weekly Roundup");
    }

    #[test]
    fn document_sections_follow_card_order() {
        let doc = document_from_cards(vec![json!(["bookmark", {}]), json!(["markdown", {}])]);
        assert_eq!(doc["sections"], json!([[10, 0], [10, 1]]));
        assert!(has_preview_cards(&doc));
        assert!(!has_image_cards(&doc));
    }
}
