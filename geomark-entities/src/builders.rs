pub trait Builder {
    type Build;
    fn build() -> Self::Build;
}

pub use self::{reading_builder::*, tagged_location_builder::*};

pub mod tagged_location_builder {

    use super::*;
    use crate::{
        address::*, category::*, geo::*, id::*, tagged_location::*, time::Timestamp,
    };

    #[derive(Debug)]
    pub struct TaggedLocationBuild {
        location: TaggedLocation,
    }

    impl TaggedLocationBuild {
        pub fn id(mut self, id: &str) -> Self {
            self.location.id = id.into();
            self
        }
        pub fn pos(mut self, pos: MapPoint) -> Self {
            self.location.pos = pos;
            self
        }
        pub fn created_at(mut self, at: Timestamp) -> Self {
            self.location.created_at = at;
            self
        }
        pub fn description(mut self, desc: &str) -> Self {
            self.location.description = desc.into();
            self
        }
        pub fn category(mut self, category: Category) -> Self {
            self.location.category = category;
            self
        }
        pub fn address(mut self, address: Option<Address>) -> Self {
            self.location.address = address;
            self
        }
        pub fn finish(self) -> TaggedLocation {
            self.location
        }
    }

    impl Builder for TaggedLocation {
        type Build = TaggedLocationBuild;
        fn build() -> Self::Build {
            TaggedLocationBuild {
                location: TaggedLocation {
                    id: Id::new(),
                    pos: MapPoint::from_lat_lng_deg(0.0, 0.0),
                    created_at: Timestamp::from_millis(0),
                    description: "".into(),
                    category: Category::default(),
                    address: None,
                },
            }
        }
    }
}

pub mod reading_builder {

    use super::*;
    use crate::{geo::*, reading::*, time::Timestamp};

    #[derive(Debug)]
    pub struct ReadingBuild {
        reading: Reading,
    }

    impl ReadingBuild {
        pub fn pos(mut self, pos: MapPoint) -> Self {
            self.reading.pos = pos;
            self
        }
        pub fn lat_lng_deg(mut self, lat: f64, lng: f64) -> Self {
            self.reading.pos = MapPoint::from_lat_lng_deg(lat, lng);
            self
        }
        pub fn accuracy_m(mut self, meters: f64) -> Self {
            self.reading.accuracy = Accuracy::from_meters(meters);
            self
        }
        pub fn recorded_at(mut self, at: Timestamp) -> Self {
            self.reading.recorded_at = at;
            self
        }
        pub fn recorded_at_seconds(mut self, seconds: i64) -> Self {
            self.reading.recorded_at = Timestamp::from_seconds(seconds);
            self
        }
        pub fn finish(self) -> Reading {
            self.reading
        }
    }

    impl Builder for Reading {
        type Build = ReadingBuild;
        fn build() -> Self::Build {
            ReadingBuild {
                reading: Reading {
                    pos: MapPoint::from_lat_lng_deg(48.7755, 9.1827),
                    accuracy: Accuracy::from_meters(10.0),
                    recorded_at: Timestamp::from_millis(0),
                },
            }
        }
    }
}
