use super::error::Error;
use crate::items::{Model, Status};
use crate::{Id, Store};

use log::*;
use std::collections::HashMap;

pub fn create(store: &Store, model: Model) -> Result<Model, Error> {
    debug!("New Item Model to be inserted: {model:?}");

    model.validate().map_err(Error::validation)?;
    if model.id != 0 {
        return Err(Error::validation(vec![
            "Can not create item that has an id".to_string(),
        ]));
    }

    let item = Model {
        id: store.next_item_id(),
        ..model
    };
    store.items.insert(item.id, item.clone());

    Ok(item)
}

/// Replaces the item stored under `id`. A body id of `0` is taken to mean `id`.
pub fn update(store: &Store, id: Id, model: Model) -> Result<Model, Error> {
    if model.id != 0 && model.id != id {
        return Err(Error::validation(vec![format!(
            "item with id {} can not be updated in path with id {id}",
            model.id
        )]));
    }
    model.validate().map_err(Error::validation)?;

    match store.items.get_mut(&id) {
        Some(mut existing) => {
            debug!("Existing Item model to be Updated: {:?}", *existing);

            let item = Model { id, ..model };
            *existing = item.clone();
            Ok(item)
        }
        None => {
            debug!("Item with id {id} not found");
            Err(Error::not_found())
        }
    }
}

pub fn delete_by_id(store: &Store, id: Id) -> Result<(), Error> {
    store
        .items
        .remove(&id)
        .map(|_| ())
        .ok_or_else(Error::not_found)
}

/// Removes every item with `status` and returns how many went away.
pub fn delete_many_by_status(store: &Store, status: Status) -> usize {
    let before = store.items.len();
    store.items.retain(|_, item| item.status != status);
    let deleted = before.saturating_sub(store.items.len());

    debug!("Deleted {deleted} item(s) with status {status:?}");
    deleted
}

/// Assigns new `orderno` values by item id and returns the whole list in its
/// new order.
///
/// Fails with `RecordNotFound` before touching anything if an id is unknown.
pub fn reorder(store: &Store, ordernos: &HashMap<Id, i64>) -> Result<Vec<Model>, Error> {
    if let Some(id) = ordernos.keys().find(|id| !store.items.contains_key(id)) {
        debug!("Can not reorder unknown item {id}");
        return Err(Error::not_found());
    }

    for (id, orderno) in ordernos {
        if let Some(mut item) = store.items.get_mut(id) {
            item.orderno = *orderno;
        }
    }

    Ok(find_all(store))
}

pub fn find_by_id(store: &Store, id: Id) -> Result<Model, Error> {
    store
        .items
        .get(&id)
        .map(|item| item.value().clone())
        .ok_or_else(Error::not_found)
}

/// All items ordered by `orderno`, then by id.
pub fn find_all(store: &Store) -> Vec<Model> {
    let mut items: Vec<Model> = store.items.iter().map(|item| item.value().clone()).collect();
    items.sort_by_key(|item| (item.orderno, item.id));
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EntityApiErrorKind;

    fn milk() -> Model {
        Model {
            id: 0,
            title: "Milk".to_string(),
            status: Status::Open,
            orderno: 0,
        }
    }

    #[test]
    fn test_create_assigns_increasing_ids() {
        let store = Store::new();
        let first = create(&store, milk()).unwrap();
        let second = create(&store, milk()).unwrap();

        assert_eq!((first.id, second.id), (1, 2));
        assert_eq!(find_by_id(&store, 2).unwrap(), second);
    }

    #[test]
    fn test_create_rejects_missing_title_and_preset_id() {
        let store = Store::new();

        let untitled = Model {
            title: "  ".to_string(),
            ..milk()
        };
        assert_eq!(
            create(&store, untitled).unwrap_err().error_kind,
            EntityApiErrorKind::ValidationError(vec!["Title is missing".to_string()])
        );

        let with_id = Model { id: 5, ..milk() };
        assert!(matches!(
            create(&store, with_id).unwrap_err().error_kind,
            EntityApiErrorKind::ValidationError(_)
        ));
        assert!(find_all(&store).is_empty());
    }

    #[test]
    fn test_update_replaces_fields() {
        let store = Store::new();
        let item = create(&store, milk()).unwrap();

        let checked = Model {
            status: Status::Checked,
            ..item.clone()
        };
        assert_eq!(update(&store, item.id, checked.clone()).unwrap(), checked);
        assert_eq!(find_by_id(&store, item.id).unwrap().status, Status::Checked);
    }

    #[test]
    fn test_update_rejects_mismatched_ids_and_unknown_items() {
        let store = Store::new();
        let item = create(&store, milk()).unwrap();

        let moved = Model { id: 42, ..item };
        assert!(matches!(
            update(&store, 1, moved).unwrap_err().error_kind,
            EntityApiErrorKind::ValidationError(_)
        ));
        assert_eq!(
            update(&store, 42, milk()).unwrap_err().error_kind,
            EntityApiErrorKind::RecordNotFound
        );
    }

    #[test]
    fn test_delete_removes_the_item_once() {
        let store = Store::new();
        let item = create(&store, milk()).unwrap();

        delete_by_id(&store, item.id).unwrap();
        assert_eq!(
            delete_by_id(&store, item.id).unwrap_err().error_kind,
            EntityApiErrorKind::RecordNotFound
        );
        assert_eq!(
            find_by_id(&store, item.id).unwrap_err().error_kind,
            EntityApiErrorKind::RecordNotFound
        );
    }

    #[test]
    fn test_find_all_orders_by_orderno_then_id() {
        let store = Store::new();
        let bread = create(
            &store,
            Model {
                title: "Bread".to_string(),
                orderno: 2,
                ..milk()
            },
        )
        .unwrap();
        let eggs = create(
            &store,
            Model {
                title: "Eggs".to_string(),
                orderno: 1,
                ..milk()
            },
        )
        .unwrap();
        let butter = create(
            &store,
            Model {
                title: "Butter".to_string(),
                orderno: 1,
                ..milk()
            },
        )
        .unwrap();

        let ids: Vec<Id> = find_all(&store).iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![eggs.id, butter.id, bread.id]);
    }

    #[test]
    fn test_delete_many_by_status_keeps_the_other_status() {
        let store = Store::new();
        let open = create(&store, milk()).unwrap();
        for title in ["Bread", "Eggs"] {
            create(
                &store,
                Model {
                    title: title.to_string(),
                    status: Status::Checked,
                    ..milk()
                },
            )
            .unwrap();
        }

        assert_eq!(delete_many_by_status(&store, Status::Checked), 2);
        assert_eq!(find_all(&store), vec![open]);
        assert_eq!(delete_many_by_status(&store, Status::Checked), 0);
    }

    #[test]
    fn test_reorder_returns_the_list_in_its_new_order() {
        let store = Store::new();
        let first = create(&store, milk()).unwrap();
        let second = create(
            &store,
            Model {
                title: "Bread".to_string(),
                ..milk()
            },
        )
        .unwrap();

        let items = reorder(&store, &HashMap::from([(first.id, 2), (second.id, 1)])).unwrap();

        let order: Vec<(Id, i64)> = items.iter().map(|item| (item.id, item.orderno)).collect();
        assert_eq!(order, vec![(second.id, 1), (first.id, 2)]);
        assert_eq!(find_by_id(&store, first.id).unwrap().orderno, 2);
    }

    #[test]
    fn test_reorder_with_an_unknown_id_changes_nothing() {
        let store = Store::new();
        let item = create(&store, milk()).unwrap();

        assert_eq!(
            reorder(&store, &HashMap::from([(item.id, 5), (77, 1)]))
                .unwrap_err()
                .error_kind,
            EntityApiErrorKind::RecordNotFound
        );
        assert_eq!(find_by_id(&store, item.id).unwrap().orderno, 0);
    }
}
