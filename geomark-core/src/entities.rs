pub use geomark_entities::{
    address::*, category::*, geo::*, id::*, reading::*, tagged_location::*, time::*,
};
