use crate::types::BookSource;

/// Case-insensitive substring match on title or id. Whitespace in both the
/// query and the title is normalized first; an empty query keeps everything.
pub fn filter_sources<'a>(sources: &'a [BookSource], query: &str) -> Vec<&'a BookSource> {
    let q = norm_query(query);
    if q.is_empty() {
        return sources.iter().collect();
    }
    sources
        .iter()
        .filter(|s| norm_query(&s.title).contains(&q) || s.id.contains(&q))
        .collect()
}

/// 1-based page of `per_page` items; out of range yields an empty slice.
pub fn paginate<T>(items: &[T], page: usize, per_page: usize) -> &[T] {
    if page == 0 || per_page == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(per_page);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(per_page).min(items.len());
    &items[start..end]
}

pub fn page_count(total: usize, per_page: usize) -> usize {
    if per_page == 0 { 0 } else { total.div_ceil(per_page) }
}

fn norm_query(q: &str) -> String {
    let t = q.trim().to_lowercase();
    let mut o = String::with_capacity(t.len());
    let mut s = false;
    for c in t.chars() {
        if c.is_whitespace() {
            if !s { o.push(' '); s = true; }
        } else {
            o.push(c); s = false;
        }
    }
    o
}

#[cfg(test)]
mod tests {
    use super::*;

    fn src(id: &str, title: &str) -> BookSource {
        BookSource {
            id: id.into(),
            title: title.into(),
            original_url: format!("https://books.example/content/id/{id}.html"),
            json_url: format!("https://books.example/json/{id}.json"),
            update_date: None,
        }
    }

    #[test]
    fn filters_by_title_or_id() {
        let all = vec![src("101", "Qidian  Mobile"), src("202", "笔趣阁 Mirror"), src("310", "Novel Hub")];
        let ids = |v: Vec<&BookSource>| v.into_iter().map(|s| s.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(filter_sources(&all, "qidian mobile")), vec!["101"]);
        assert_eq!(ids(filter_sources(&all, "笔趣")), vec!["202"]);
        assert_eq!(ids(filter_sources(&all, "10")), vec!["101", "310"]);
        assert_eq!(filter_sources(&all, "   ").len(), 3);
        assert!(filter_sources(&all, "nothing").is_empty());
    }

    #[test]
    fn pages() {
        let items: Vec<u32> = (1..=25).collect();
        assert_eq!(paginate(&items, 1, 10), &items[..10]);
        assert_eq!(paginate(&items, 3, 10), &[21, 22, 23, 24, 25]);
        assert!(paginate(&items, 4, 10).is_empty());
        assert!(paginate(&items, 0, 10).is_empty());
        assert_eq!(page_count(25, 10), 3);
        assert_eq!(page_count(0, 10), 0);
    }
}
