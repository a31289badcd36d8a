use itertools::Itertools;

#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Address {
    pub street  : Option<String>,
    pub zip     : Option<String>,
    pub city    : Option<String>,
    pub country : Option<String>,
    pub state   : Option<String>,
}

impl Address {
    pub fn is_empty(&self) -> bool {
        self.street.is_none()
            && self.zip.is_none()
            && self.city.is_none()
            && self.country.is_none()
            && self.state.is_none()
    }

    /// Two display lines: street on the first,
    /// "city state zip" on the second.
    pub fn display_lines(&self) -> (String, String) {
        let line1 = self.street.clone().unwrap_or_default();
        let line2 = [&self.city, &self.state, &self.zip]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .join(" ");
        (line1, line2)
    }

    /// One comma-separated line including the country.
    pub fn single_line(&self) -> String {
        let state_zip = [&self.state, &self.zip]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .join(" ");
        let state_zip = (!state_zip.is_empty()).then_some(state_zip);
        [
            self.street.clone(),
            self.city.clone(),
            state_zip,
            self.country.clone(),
        ]
        .into_iter()
        .flatten()
        .join(", ")
    }
}
