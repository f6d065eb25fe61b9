use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

/// Place-type tag understood by the places service.
///
/// The string form is the `type` query parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Category {
    Restaurant,
    Cafe,
    Bar,
    Hospital,
    Pharmacy,
    GasStation,
    Supermarket,
    Park,
    Museum,
    Zoo,
    Hotel,
    Atm,
}

impl Category {
    pub fn all() -> impl Iterator<Item = Category> {
        Category::iter()
    }
}

/// The user's category selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn is_all(&self) -> bool {
        matches!(self, CategoryFilter::All)
    }
}

impl From<Category> for CategoryFilter {
    fn from(category: Category) -> Self {
        CategoryFilter::Only(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_category_wire_names() {
        assert_eq!(Category::GasStation.to_string(), "gas_station");
        assert_eq!(Category::Zoo.as_ref(), "zoo");
        assert_eq!(Category::from_str("restaurant").unwrap(), Category::Restaurant);
        assert!(Category::from_str("spaceport").is_err());
    }

    #[test]
    fn test_all_categories_are_listed_once() {
        let all: Vec<_> = Category::all().collect();
        assert_eq!(all.len(), 12);
        assert_eq!(all[0], Category::Restaurant);
    }
}
