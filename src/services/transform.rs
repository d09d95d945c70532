use crate::models::external::{BookItem, ProcessedBook, ProcessedBooksResult, RawSearchResult};

/// Placeholder used when upstream lists no authors. Clients match on it verbatim.
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// Year from the leading four characters of a `publishedDate` such as
/// `"2020"`, `"2020-05"` or `"2020-05-01"`.
pub fn published_year(published_date: Option<&str>) -> Option<i32> {
    let date = published_date?;
    let year = date.get(..4)?;
    year.parse::<i32>().ok()
}

fn process_item(item: &BookItem) -> ProcessedBook {
    let info = &item.volume_info;

    let authors = match info.authors {
        Some(ref authors) if !authors.is_empty() => authors.clone(),
        _ => vec![UNKNOWN_AUTHOR.to_string()],
    };

    let thumbnail = info
        .image_links
        .as_ref()
        .and_then(|links| links.get("thumbnail"))
        .filter(|thumbnail| !thumbnail.is_empty())
        .cloned();

    ProcessedBook {
        id: item.id.clone(),
        title: info.title.clone(),
        authors,
        published_year: published_year(info.published_date.as_deref()),
        page_count: info.page_count,
        categories: info.categories.clone().unwrap_or_default(),
        thumbnail,
        preview_link: info.preview_link.clone(),
        language: info.language.clone(),
    }
}

/// Normalizes a raw search response. `total_books` counts the returned
/// items, not upstream's `totalItems`.
pub fn transform(raw: &RawSearchResult) -> ProcessedBooksResult {
    let books: Vec<ProcessedBook> = raw.items.iter().map(process_item).collect();

    ProcessedBooksResult {
        total_books: books.len(),
        books,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::external::VolumeInfo;
    use std::collections::HashMap;

    fn volume(title: &str) -> VolumeInfo {
        VolumeInfo {
            title: title.to_string(),
            authors: None,
            publisher: None,
            published_date: None,
            description: None,
            page_count: None,
            categories: None,
            image_links: None,
            language: None,
            preview_link: None,
            info_link: None,
        }
    }

    fn raw_with(items: Vec<BookItem>) -> RawSearchResult {
        RawSearchResult {
            kind: "books#volumes".to_string(),
            total_items: 500,
            items,
        }
    }

    fn full_item() -> BookItem {
        let mut links = HashMap::new();
        links.insert(
            "thumbnail".to_string(),
            "http://books.google.com/thumb.jpg".to_string(),
        );
        links.insert(
            "smallThumbnail".to_string(),
            "http://books.google.com/small.jpg".to_string(),
        );

        BookItem {
            id: "zyTCAlFPjgYC".to_string(),
            volume_info: VolumeInfo {
                authors: Some(vec!["Mark Lutz".to_string()]),
                published_date: Some("2020-05-01".to_string()),
                page_count: Some(1594),
                categories: Some(vec!["Computers".to_string()]),
                image_links: Some(links),
                language: Some("en".to_string()),
                preview_link: Some("http://books.google.com/preview".to_string()),
                ..volume("Learning Python")
            },
        }
    }

    #[test]
    fn test_full_item() {
        let result = transform(&raw_with(vec![full_item()]));
        let book = &result.books[0];

        assert_eq!(book.id, "zyTCAlFPjgYC");
        assert_eq!(book.title, "Learning Python");
        assert_eq!(book.authors, vec!["Mark Lutz".to_string()]);
        assert_eq!(book.published_year, Some(2020));
        assert_eq!(book.page_count, Some(1594));
        assert_eq!(book.categories, vec!["Computers".to_string()]);
        assert_eq!(
            book.thumbnail.as_deref(),
            Some("http://books.google.com/thumb.jpg")
        );
        assert_eq!(
            book.preview_link.as_deref(),
            Some("http://books.google.com/preview")
        );
        assert_eq!(book.language.as_deref(), Some("en"));
    }

    #[test]
    fn test_published_year_edge_cases() {
        assert_eq!(published_year(Some("2020-05-01")), Some(2020));
        assert_eq!(published_year(Some("1999")), Some(1999));
        assert_eq!(published_year(Some("")), None);
        assert_eq!(published_year(Some("abc")), None);
        assert_eq!(published_year(Some("20")), None);
        assert_eq!(published_year(Some("abcd-01")), None);
        assert_eq!(published_year(None), None);
        // Multi-byte input must not panic on a char boundary.
        assert_eq!(published_year(Some("19é9")), None);
    }

    #[test]
    fn test_missing_fields_get_defaults() {
        let item = BookItem {
            id: "bare".to_string(),
            volume_info: volume("Bare"),
        };
        let book = &transform(&raw_with(vec![item])).books[0];

        assert_eq!(book.authors, vec![UNKNOWN_AUTHOR.to_string()]);
        assert!(book.categories.is_empty());
        assert_eq!(book.thumbnail, None);
        assert_eq!(book.published_year, None);
        assert_eq!(book.page_count, None);
        assert_eq!(book.preview_link, None);
        assert_eq!(book.language, None);
    }

    #[test]
    fn test_empty_author_list_uses_sentinel() {
        let item = BookItem {
            id: "x".to_string(),
            volume_info: VolumeInfo {
                authors: Some(Vec::new()),
                ..volume("No Authors")
            },
        };
        let book = &transform(&raw_with(vec![item])).books[0];
        assert_eq!(book.authors, vec!["Unknown Author".to_string()]);
    }

    #[test]
    fn test_image_links_without_thumbnail() {
        let mut links = HashMap::new();
        links.insert("smallThumbnail".to_string(), "http://small".to_string());
        let item = BookItem {
            id: "x".to_string(),
            volume_info: VolumeInfo {
                image_links: Some(links),
                ..volume("Small Only")
            },
        };
        assert_eq!(transform(&raw_with(vec![item])).books[0].thumbnail, None);
    }

    #[test]
    fn test_empty_thumbnail_is_none() {
        let mut links = HashMap::new();
        links.insert("thumbnail".to_string(), String::new());
        let item = BookItem {
            id: "x".to_string(),
            volume_info: VolumeInfo {
                image_links: Some(links),
                ..volume("Blank Cover")
            },
        };
        assert_eq!(transform(&raw_with(vec![item])).books[0].thumbnail, None);
    }

    #[test]
    fn test_order_and_count() {
        let items: Vec<BookItem> = (0..4)
            .map(|i| BookItem {
                id: format!("id-{}", i),
                volume_info: volume(&format!("Title {}", i)),
            })
            .collect();

        let result = transform(&raw_with(items));
        assert_eq!(result.total_books, 4);
        let ids: Vec<_> = result.books.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["id-0", "id-1", "id-2", "id-3"]);
    }

    #[test]
    fn test_empty_result() {
        let result = transform(&raw_with(Vec::new()));
        assert_eq!(result.total_books, 0);
        assert!(result.books.is_empty());
    }

    #[test]
    fn test_deterministic() {
        let raw = raw_with(vec![full_item(), full_item()]);
        assert_eq!(transform(&raw), transform(&raw));
    }
}
