use crate::api::models::{User, UserSummary};

/// Anything the client-side list filter can match against.
pub trait Searchable {
    /// Fields compared against the query, case-insensitively.
    fn search_fields(&self) -> Vec<&str>;

    fn matches(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.search_fields()
            .into_iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

impl Searchable for User {
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.username, &self.first_name, &self.last_name]
    }
}

impl Searchable for UserSummary {
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.username, &self.first_name, &self.last_name]
    }
}

/// The subset of `items` matching `query`, in original order.
/// An empty query keeps everything. Whitespace is part of the query.
pub fn filter<T: Searchable + Clone>(items: &[T], query: &str) -> Vec<T> {
    items
        .iter()
        .filter(|item| item.matches(query))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(username: &str, first: &str, last: &str) -> UserSummary {
        UserSummary {
            user_id: 0,
            username: username.into(),
            first_name: first.into(),
            last_name: last.into(),
            profile_picture: None,
            college: None,
            is_following: false,
        }
    }

    fn people() -> Vec<UserSummary> {
        vec![
            summary("ada_l", "Ada", "Lovelace"),
            summary("grace", "Grace", "Hopper"),
            summary("alan", "Alan", "Turing"),
            summary("edsger", "Edsger", "Dijkstra"),
        ]
    }

    #[test]
    fn empty_query_keeps_all() {
        assert_eq!(filter(&people(), "").len(), 4);
    }

    #[test]
    fn whitespace_is_matched_literally() {
        assert!(filter(&people(), "ada ").is_empty());
        assert!(filter(&people(), " ").is_empty());

        let spaced = vec![summary("mary_ann", "Mary Ann", "Evans")];
        assert_eq!(filter(&spaced, "y a").len(), 1);
    }

    #[test]
    fn matches_any_field_case_insensitively() {
        let names: Vec<_> = filter(&people(), "HOP")
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(names, vec!["grace"]);

        let names: Vec<_> = filter(&people(), "a")
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(names, vec!["ada_l", "grace", "alan", "edsger"]);
    }

    #[test]
    fn result_is_exactly_the_matching_subset() {
        let items = people();
        for query in ["ur", "d", "xyz", "Lovelace", "ALAN"] {
            let kept = filter(&items, query);
            let expected: Vec<_> = items.iter().filter(|u| u.matches(query)).cloned().collect();
            assert_eq!(kept, expected);
            for item in &items {
                let hit = item
                    .search_fields()
                    .iter()
                    .any(|f| f.to_lowercase().contains(&query.to_lowercase()));
                assert_eq!(kept.contains(item), hit, "query {query:?} item {}", item.username);
            }
        }
    }

    #[test]
    fn no_match_is_empty() {
        assert!(filter(&people(), "zzz").is_empty());
    }
}
