use super::SiteRules;

pub const BASE_URL: &str = "https://kun.uz";

/// Markup rules for kun.uz listing and article pages.
pub fn rules() -> SiteRules {
    SiteRules {
        base_url: BASE_URL.to_string(),
        article_link: "a.news-page__item[href]".to_string(),
        article_path: r"/news/\d{4}/\d{2}/\d{2}/".to_string(),
        load_more: "div.point-view__footer button".to_string(),
        heading: "h1".to_string(),
        published_meta: r#"meta[property="article:published_time"]"#.to_string(),
        image_meta: r#"meta[property="og:image"]"#.to_string(),
        content_containers: vec![
            "div.single-content".to_string(),
            "div.news-inner__content".to_string(),
        ],
        noise: "script, style, figure, iframe, .share, .ads".to_string(),
        paragraph: "p".to_string(),
        cookie_keyword: "cookies".to_string(),
        min_content_chars: 200,
    }
}
