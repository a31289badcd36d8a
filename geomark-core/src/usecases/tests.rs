use std::cell::RefCell;

use super::prelude::*;
use super::*;
use crate::repositories::Error as RepoError;

use geomark_entities::builders::Builder;

type RepoResult<T> = std::result::Result<T, RepoError>;

#[derive(Default)]
pub struct MockRepo {
    pub locations: RefCell<Vec<TaggedLocation>>,
}

impl TaggedLocationRepo for MockRepo {
    fn create_tagged_location(&self, location: &TaggedLocation) -> RepoResult<()> {
        let mut locations = self.locations.borrow_mut();
        if locations.iter().any(|l| l.id == location.id) {
            return Err(RepoError::AlreadyExists);
        }
        locations.push(location.clone());
        Ok(())
    }

    fn update_tagged_location(&self, location: &TaggedLocation) -> RepoResult<()> {
        let mut locations = self.locations.borrow_mut();
        let existing = locations
            .iter_mut()
            .find(|l| l.id == location.id)
            .ok_or(RepoError::NotFound)?;
        *existing = location.clone();
        Ok(())
    }

    fn get_tagged_location(&self, id: &str) -> RepoResult<TaggedLocation> {
        self.locations
            .borrow()
            .iter()
            .find(|l| l.id.as_str() == id)
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    fn all_tagged_locations(&self) -> RepoResult<Vec<TaggedLocation>> {
        let mut locations = self.locations.borrow().clone();
        locations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(locations)
    }

    fn count_tagged_locations(&self) -> RepoResult<usize> {
        Ok(self.locations.borrow().len())
    }

    fn delete_tagged_location(&self, id: &str) -> RepoResult<()> {
        let mut locations = self.locations.borrow_mut();
        let len_before = locations.len();
        locations.retain(|l| l.id.as_str() != id);
        if locations.len() == len_before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

fn new_location(description: &str, category: &str) -> NewTaggedLocation {
    NewTaggedLocation {
        lat: 48.7755,
        lng: 9.1827,
        description: description.into(),
        category: category.into(),
        address: None,
    }
}

#[test]
fn tag_a_new_location() {
    let repo = MockRepo::default();
    let storable = prepare_new_tagged_location(
        new_location("favorite coffee", "Bar"),
        Timestamp::from_seconds(100),
    )
    .unwrap();
    let stored = store_new_tagged_location(&repo, storable).unwrap();
    assert_eq!(Category::Bar, stored.category);
    assert_eq!("favorite coffee", stored.description);
    assert_eq!(1, repo.count_tagged_locations().unwrap());
    assert_eq!(stored, get_tagged_location(&repo, &stored.id).unwrap());
}

#[test]
fn reject_out_of_range_position() {
    let new = NewTaggedLocation {
        lat: 91.0,
        ..new_location("", "No Category")
    };
    assert!(matches!(
        prepare_new_tagged_location(new, Timestamp::from_seconds(0)),
        Err(Error::InvalidPosition)
    ));
}

#[test]
fn reject_unknown_category() {
    let err =
        prepare_new_tagged_location(new_location("", "Supermarket"), Timestamp::from_seconds(0))
            .unwrap_err();
    assert!(matches!(err, Error::Category));
}

#[test]
fn drop_an_all_empty_address_snapshot() {
    let new = NewTaggedLocation {
        address: Some(Address::default()),
        ..new_location("", "Park")
    };
    let storable = prepare_new_tagged_location(new, Timestamp::from_seconds(0)).unwrap();
    let repo = MockRepo::default();
    let stored = store_new_tagged_location(&repo, storable).unwrap();
    assert_eq!(None, stored.address);
}

#[test]
fn update_overwrites_all_fields() {
    let repo = MockRepo::default();
    let address = Address {
        street: Some("12 Main Street".into()),
        ..Default::default()
    };
    let existing = TaggedLocation::build()
        .description("old")
        .category(Category::House)
        .address(Some(address))
        .created_at(Timestamp::from_seconds(100))
        .finish();
    repo.create_tagged_location(&existing).unwrap();

    let update = UpdatedTaggedLocation {
        lat: 49.4836,
        lng: 8.4630,
        description: "new".into(),
        category: "Landmark".into(),
        address: None,
    };
    let updated = update_tagged_location(
        &repo,
        existing.id.clone(),
        update,
        existing.created_at,
    )
    .unwrap();

    let reloaded = get_tagged_location(&repo, &existing.id).unwrap();
    assert_eq!(updated, reloaded);
    assert_eq!("new", reloaded.description);
    assert_eq!(Category::Landmark, reloaded.category);
    assert_eq!(None, reloaded.address);
    assert_eq!(
        MapPoint::from_lat_lng_deg(49.4836, 8.4630),
        reloaded.pos
    );
    // The tag time survives the edit.
    assert_eq!(existing.created_at, reloaded.created_at);
}

#[test]
fn update_of_missing_record_fails() {
    let repo = MockRepo::default();
    let err = update_tagged_location(
        &repo,
        Id::new(),
        UpdatedTaggedLocation {
            lat: 0.0,
            lng: 0.0,
            category: "No Category".into(),
            ..Default::default()
        },
        Timestamp::from_seconds(0),
    )
    .unwrap_err();
    assert!(matches!(err, Error::Repo(RepoError::NotFound)));
}

#[test]
fn list_newest_first() {
    let repo = MockRepo::default();
    for seconds in [100, 300, 200] {
        let location = TaggedLocation::build()
            .created_at(Timestamp::from_seconds(seconds))
            .finish();
        repo.create_tagged_location(&location).unwrap();
    }
    let all = load_tagged_locations(&repo).unwrap();
    let stamps: Vec<_> = all.iter().map(|l| l.created_at.as_seconds()).collect();
    assert_eq!(vec![300, 200, 100], stamps);
}

#[test]
fn delete_a_record() {
    let repo = MockRepo::default();
    let location = TaggedLocation::build().finish();
    repo.create_tagged_location(&location).unwrap();
    delete_tagged_location(&repo, &location.id).unwrap();
    assert_eq!(0, repo.count_tagged_locations().unwrap());
    assert!(matches!(
        delete_tagged_location(&repo, &location.id),
        Err(Error::Repo(RepoError::NotFound))
    ));
}
