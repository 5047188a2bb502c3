//! Vehicle categories and label mapping.
//!
//! The category set is closed: every raw detector label maps to exactly one
//! category, with `Other` as the defined fallback for labels outside the
//! table. Mapping is a data-driven lookup, not branching, so extending the
//! set is a table change.

use serde::{Deserialize, Serialize};

/// Closed set of vehicle categories.
///
/// Declaration order is the fixed precedence order used to break ties when
/// picking a dominant category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Car,
    Bike,
    Bus,
    Truck,
    Other,
}

/// All categories in precedence order.
pub const CATEGORIES: [Category; 5] = [
    Category::Car,
    Category::Bike,
    Category::Bus,
    Category::Truck,
    Category::Other,
];

/// Raw detector class label -> category.
///
/// Labels are matched case-insensitively. "train" is deliberately present and
/// mapped to `Other`: the upstream detector reports it, but it is not a road
/// vehicle class we break out.
const LABEL_TABLE: [(&str, Category); 6] = [
    ("bicycle", Category::Bike),
    ("car", Category::Car),
    ("motorcycle", Category::Bike),
    ("bus", Category::Bus),
    ("train", Category::Other),
    ("truck", Category::Truck),
];

/// Presentation labels, singular and plural. The plural forms double as the
/// bucket table column names.
const DISPLAY_TABLE: [(Category, &str, &str); 5] = [
    (Category::Car, "car", "cars"),
    (Category::Bike, "bike", "bikes"),
    (Category::Bus, "bus", "buses"),
    (Category::Truck, "truck", "trucks"),
    (Category::Other, "others", "others"),
];

impl Category {
    /// Map a raw detector class label to a category.
    ///
    /// Total: an unmapped label is not an error, it is `Other`.
    pub fn from_label(raw: &str) -> Category {
        let needle = raw.trim().to_lowercase();
        LABEL_TABLE
            .iter()
            .find(|(label, _)| *label == needle)
            .map(|(_, category)| *category)
            .unwrap_or(Category::Other)
    }

    /// Stable index into per-category count arrays.
    pub fn index(self) -> usize {
        match self {
            Category::Car => 0,
            Category::Bike => 1,
            Category::Bus => 2,
            Category::Truck => 3,
            Category::Other => 4,
        }
    }

    pub fn label(self) -> &'static str {
        DISPLAY_TABLE[self.index()].1
    }

    pub fn plural_label(self) -> &'static str {
        DISPLAY_TABLE[self.index()].2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_labels() {
        assert_eq!(Category::from_label("car"), Category::Car);
        assert_eq!(Category::from_label("bicycle"), Category::Bike);
        assert_eq!(Category::from_label("motorcycle"), Category::Bike);
        assert_eq!(Category::from_label("bus"), Category::Bus);
        assert_eq!(Category::from_label("truck"), Category::Truck);
        assert_eq!(Category::from_label("train"), Category::Other);
    }

    #[test]
    fn mapping_is_case_insensitive() {
        assert_eq!(Category::from_label("CAR"), Category::Car);
        assert_eq!(Category::from_label("Bicycle"), Category::Bike);
        assert_eq!(Category::from_label(" Truck "), Category::Truck);
    }

    #[test]
    fn unknown_labels_fall_back_to_other() {
        assert_eq!(Category::from_label("boat"), Category::Other);
        assert_eq!(Category::from_label(""), Category::Other);
        assert_eq!(Category::from_label("aeroplane"), Category::Other);
    }

    #[test]
    fn plural_labels_match_column_names() {
        let columns: Vec<&str> = CATEGORIES.iter().map(|c| c.plural_label()).collect();
        assert_eq!(columns, vec!["cars", "bikes", "buses", "trucks", "others"]);
    }

    #[test]
    fn index_is_declaration_order() {
        for (position, category) in CATEGORIES.iter().enumerate() {
            assert_eq!(category.index(), position);
        }
    }
}
