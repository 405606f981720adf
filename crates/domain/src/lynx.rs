//! Lynx: bookmark preview cards for roundup posts.

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use url::Url;

use crate::{mobiledoc, PostEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    AlreadyHasPreviews,
    NotRoundup,
}

/// 只有首次创建、尚无卡片的 roundup 文章才生成预览
pub fn eligibility(event: &PostEvent) -> Eligibility {
    let post = &event.current;
    if !post.is_roundup() {
        return Eligibility::NotRoundup;
    }
    match post.html.as_deref() {
        Some(html) if !has_embed_cards(html) && event.is_first_revision() => {
            let doc_has_previews = post
                .mobiledoc
                .as_deref()
                .and_then(|raw| mobiledoc::parse(raw).ok())
                .map(|doc| mobiledoc::has_preview_cards(&doc))
                .unwrap_or(false);
            if doc_has_previews {
                Eligibility::AlreadyHasPreviews
            } else {
                Eligibility::Eligible
            }
        }
        _ => Eligibility::AlreadyHasPreviews,
    }
}

pub fn has_embed_cards(html: &str) -> bool {
    html.contains("kg-card")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    pub href: String,
    pub text: String,
}

/// Anchors with an absolute http(s) href, in document order.
pub fn extract_anchors(html: &str) -> Vec<Anchor> {
    let document = Html::parse_fragment(html);
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|a| {
            let href = a.value().attr("href")?.trim();
            let url = Url::parse(href).ok()?;
            if url.scheme() != "http" && url.scheme() != "https" {
                return None;
            }
            Some(Anchor {
                href: href.to_string(),
                text: normalize_text(a),
            })
        })
        .collect()
}

fn normalize_text(el: ElementRef<'_>) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Ghost bookmark card `metadata` payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub icon: Option<String>,
    pub publisher: Option<String>,
    pub author: Option<String>,
}

/// 从页面 HTML 中读取 og/twitter/标准 meta 标签
pub fn parse_page_metadata(page_url: &str, html: &str) -> PageMetadata {
    let document = Html::parse_document(html);
    let base = Url::parse(page_url).ok();

    let title = meta_content(&document, &["meta[property='og:title']", "meta[name='twitter:title']"])
        .or_else(|| first_text(&document, "title"));
    let description = meta_content(
        &document,
        &[
            "meta[property='og:description']",
            "meta[name='twitter:description']",
            "meta[name='description']",
        ],
    );
    let thumbnail = meta_content(
        &document,
        &["meta[property='og:image']", "meta[name='twitter:image']"],
    )
    .map(|src| absolutize(base.as_ref(), &src));
    let icon = first_attr(&document, "link[rel~='icon']", "href")
        .map(|href| absolutize(base.as_ref(), &href));
    let publisher = meta_content(&document, &["meta[property='og:site_name']"]);
    let author = meta_content(&document, &["meta[name='author']"]);

    PageMetadata {
        url: page_url.to_string(),
        title,
        description,
        thumbnail,
        icon,
        publisher,
        author,
    }
}

fn meta_content(document: &Html, selectors: &[&str]) -> Option<String> {
    selectors
        .iter()
        .find_map(|s| first_attr(document, s, "content"))
}

fn first_attr(document: &Html, selector: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .filter_map(|el| el.value().attr(attr))
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(str::to_string)
}

fn first_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .map(normalize_text)
        .find(|t| !t.is_empty())
}

fn absolutize(base: Option<&Url>, href: &str) -> String {
    base.and_then(|b| b.join(href).ok())
        .map(|u| u.to_string())
        .unwrap_or_else(|| href.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewCard {
    Bookmark(PageMetadata),
    /// 抓取失败的链接以普通 markdown 链接保留
    PlainLink(Anchor),
}

impl PreviewCard {
    pub fn is_bookmark(&self) -> bool {
        matches!(self, Self::Bookmark(_))
    }

    pub fn url(&self) -> &str {
        match self {
            Self::Bookmark(meta) => &meta.url,
            Self::PlainLink(anchor) => &anchor.href,
        }
    }

    pub fn to_card(&self) -> Value {
        match self {
            Self::Bookmark(meta) => json!([
                "bookmark",
                { "url": meta.url, "metadata": meta, "caption": "" }
            ]),
            Self::PlainLink(anchor) => {
                let label = if anchor.text.is_empty() {
                    anchor.href.as_str()
                } else {
                    anchor.text.as_str()
                };
                json!(["markdown", { "markdown": format!("[{}]({})", label, anchor.href) }])
            }
        }
    }
}

pub fn build_preview_document(cards: &[PreviewCard]) -> Value {
    mobiledoc::document_from_cards(cards.iter().map(PreviewCard::to_card).collect())
}
