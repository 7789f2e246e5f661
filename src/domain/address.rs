use serde::Serialize;

pub const DEFAULT_COUNTRY: &str = "US";

/// Postal address of a venue.
///
/// Completeness is not guaranteed: a venue may be known only by name. An
/// online address carries no street, city, state or zip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Address {
    pub venue_name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    pub is_online: bool,
}

impl Address {
    pub fn physical(
        venue_name: impl Into<String>,
        street: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        zip: impl Into<String>,
    ) -> Self {
        Self {
            venue_name: venue_name.into(),
            street: street.into(),
            city: city.into(),
            state: state.into(),
            zip: zip.into(),
            country: DEFAULT_COUNTRY.to_string(),
            is_online: false,
        }
    }

    /// A venue known only by name, with no address details
    pub fn venue_only(venue_name: impl Into<String>) -> Self {
        Self::physical(venue_name, "", "", "", "")
    }

    pub fn online(venue_name: impl Into<String>) -> Self {
        Self {
            is_online: true,
            ..Self::venue_only(venue_name)
        }
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        let country = country.into();
        if !country.trim().is_empty() {
            self.country = country;
        }
        self
    }

    /// True when street, city and state are all known
    pub fn is_complete(&self) -> bool {
        !self.street.is_empty() && !self.city.is_empty() && !self.state.is_empty()
    }

    pub fn has_address_details(&self) -> bool {
        [&self.street, &self.city, &self.state, &self.zip]
            .iter()
            .any(|s| !s.is_empty())
    }
}

/// Where an event happens: exactly one of a physical place or online.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Place(Address),
    Online,
}

impl From<Address> for Location {
    fn from(address: Address) -> Self {
        if address.is_online {
            Location::Online
        } else {
            Location::Place(address)
        }
    }
}

impl Location {
    pub fn is_online(&self) -> bool {
        matches!(self, Location::Online)
    }

    pub fn place(&self) -> Option<&Address> {
        match self {
            Location::Place(address) => Some(address),
            Location::Online => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_online_has_no_address_details() {
        let address = Address::online("Zoom");
        assert!(address.is_online);
        assert!(!address.has_address_details());
        assert_eq!(address.country, "US");
    }

    #[test]
    fn test_venue_only_is_partial() {
        let address = Address::venue_only("The Hall");
        assert!(!address.is_online);
        assert!(!address.is_complete());
        assert_eq!(address.venue_name, "The Hall");
    }

    #[test]
    fn test_location_from_address() {
        let place = Address::physical("The Hall", "100 Main St", "Boulder", "CO", "80301");
        assert!(place.is_complete());
        assert!(matches!(Location::from(place), Location::Place(_)));
        assert!(Location::from(Address::online("Zoom")).is_online());
    }

    #[test]
    fn test_blank_country_keeps_default() {
        let address = Address::venue_only("Hall").with_country("  ");
        assert_eq!(address.country, DEFAULT_COUNTRY);
        let address = Address::venue_only("Hall").with_country("CA");
        assert_eq!(address.country, "CA");
    }
}
