use std::cmp::Ordering;

use crate::ir::LocationRecord;

/// Sibling order: more children first, then type name, then name (both
/// case-insensitive), then the raw id so that no two distinct locations tie.
#[derive(Debug, Clone, Copy)]
pub struct SortKey<'a> {
    pub child_count: u32,
    pub type_name: &'a str,
    pub name: &'a str,
    pub id: &'a str,
}

impl<'a> SortKey<'a> {
    /// Key for a bare record; a missing child count sorts as zero.
    pub fn of_record(record: &'a LocationRecord) -> Self {
        Self {
            child_count: record.child_count.unwrap_or(0),
            type_name: &record.type_name,
            name: &record.name,
            id: record.key().unwrap_or(""),
        }
    }
}

fn cmp_case_insensitive(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

impl Ord for SortKey<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .child_count
            .cmp(&self.child_count)
            .then_with(|| cmp_case_insensitive(self.type_name, other.type_name))
            .then_with(|| cmp_case_insensitive(self.name, other.name))
            .then_with(|| self.id.cmp(other.id))
    }
}

impl PartialOrd for SortKey<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SortKey<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortKey<'_> {}

/// Sibling order for bare records.
///
/// A record without `childCount` compares as having no children. The layout
/// engine fills a missing count from the snapshot before sorting, so the two
/// orders agree whenever every record carries its count.
pub fn compare_locations(a: &LocationRecord, b: &LocationRecord) -> Ordering {
    SortKey::of_record(a).cmp(&SortKey::of_record(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busiest_node_sorts_first() {
        let city = LocationRecord::new("1", "Zed")
            .with_type("City")
            .with_child_count(4);
        let hamlet = LocationRecord::new("2", "Abbey")
            .with_type("City")
            .with_child_count(1);
        assert_eq!(compare_locations(&city, &hamlet), Ordering::Less);
    }

    #[test]
    fn type_then_name_ignore_case() {
        let mut records = vec![
            LocationRecord::new("1", "beta").with_type("room"),
            LocationRecord::new("2", "Alpha").with_type("Room"),
            LocationRecord::new("3", "omega").with_type("Hall"),
        ];
        records.sort_by(compare_locations);
        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["omega", "Alpha", "beta"]);
    }

    #[test]
    fn missing_child_count_compares_as_zero() {
        let counted = LocationRecord::new("b", "Same").with_child_count(0);
        let bare = LocationRecord::new("a", "Same");
        assert_eq!(compare_locations(&bare, &counted), Ordering::Less);
        let busy = LocationRecord::new("z", "Same").with_child_count(1);
        assert_eq!(compare_locations(&busy, &bare), Ordering::Less);
    }

    #[test]
    fn identical_fields_fall_back_to_id() {
        let a = LocationRecord::new("a", "Same");
        let b = LocationRecord::new("b", "Same");
        assert_eq!(compare_locations(&a, &b), Ordering::Less);
        assert_eq!(compare_locations(&b, &a), Ordering::Greater);
        assert_eq!(compare_locations(&a, &a), Ordering::Equal);
    }
}
