use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Fixed catalogue of labels a tagged location can be filed under.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr,
)]
pub enum Category {
    #[default]
    #[strum(serialize = "No Category")]
    None,
    #[strum(serialize = "Apple Store")]
    AppleStore,
    Bar,
    Bookstore,
    Club,
    #[strum(serialize = "Grocery Store")]
    GroceryStore,
    #[strum(serialize = "Historic Building")]
    HistoricBuilding,
    House,
    #[strum(serialize = "Icecream Vendor")]
    IcecreamVendor,
    Landmark,
    Park,
}

impl Category {
    pub fn label(self) -> &'static str {
        self.into()
    }
}
