// SPDX-FileCopyrightText: 2026 Rentio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Occupant roster CRUD operations.
//!
//! Registration enforces the room capacity limit and contact uniqueness
//! inside a single transaction, so concurrent registrations cannot
//! oversubscribe a room.

use rentio_core::types::{Contact, NewOccupant, Occupant, OccupantUpdate};
use rentio_core::RentioError;
use rusqlite::params;

use crate::database::{map_tr_err, Database};

const OCCUPANT_COLUMNS: &str =
    "id, room, name, user_id, handle, phone, document_ref, paid_until, accrued_total, created_at";

fn row_to_occupant(row: &rusqlite::Row<'_>) -> Result<Occupant, rusqlite::Error> {
    Ok(Occupant {
        id: row.get(0)?,
        room: row.get(1)?,
        name: row.get(2)?,
        user_id: row.get(3)?,
        handle: row.get(4)?,
        phone: row.get(5)?,
        document_ref: row.get(6)?,
        paid_until: row.get(7)?,
        accrued_total: row.get(8)?,
        created_at: row.get(9)?,
    })
}

fn contact_columns(contact: &Contact) -> (Option<i64>, Option<String>) {
    match contact {
        Contact::UserId(id) => (Some(*id), None),
        Contact::Handle(h) => (None, Some(h.clone())),
    }
}

fn contact_taken(
    tx: &rusqlite::Transaction<'_>,
    contact: &Contact,
    exclude_id: Option<i64>,
) -> Result<bool, rusqlite::Error> {
    let (user_id, handle) = contact_columns(contact);
    let exclude = exclude_id.unwrap_or(-1);
    let count: i64 = tx.query_row(
        "SELECT COUNT(*) FROM occupants
         WHERE ((?1 IS NOT NULL AND user_id = ?1) OR (?2 IS NOT NULL AND handle = ?2))
           AND id != ?3",
        params![user_id, handle, exclude],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Register a new occupant, enforcing the per-room capacity limit and
/// contact uniqueness. Returns the new occupant id.
pub async fn create(
    db: &Database,
    new: &NewOccupant,
    room_limit: u32,
) -> Result<i64, RentioError> {
    let new = new.clone();
    db.connection()
        .call(move |conn| -> Result<Result<i64, RentioError>, rusqlite::Error> {
            let tx = conn.transaction()?;

            let count: u32 = tx.query_row(
                "SELECT COUNT(*) FROM occupants WHERE room = ?1",
                params![new.room],
                |row| row.get(0),
            )?;
            if count >= room_limit {
                return Ok(Err(RentioError::CapacityExceeded {
                    room: new.room,
                    limit: room_limit,
                }));
            }

            if contact_taken(&tx, &new.contact, None)? {
                return Ok(Err(RentioError::DuplicateContact {
                    contact: new.contact.to_string(),
                }));
            }

            let (user_id, handle) = contact_columns(&new.contact);
            tx.execute(
                "INSERT INTO occupants (room, name, user_id, handle, phone, document_ref)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    new.room,
                    new.name,
                    user_id,
                    handle,
                    new.phone,
                    new.document_ref,
                ],
            )?;
            let id = tx.last_insert_rowid();
            tx.commit()?;
            Ok(Ok(id))
        })
        .await
        .map_err(map_tr_err)?
}

/// Get an occupant by id.
pub async fn get(db: &Database, id: i64) -> Result<Occupant, RentioError> {
    db.connection()
        .call(move |conn| -> Result<Option<Occupant>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {OCCUPANT_COLUMNS} FROM occupants WHERE id = ?1"
            ))?;
            match stmt.query_row(params![id], row_to_occupant) {
                Ok(occ) => Ok(Some(occ)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)?
        .ok_or(RentioError::NotFound { occupant: id })
}

/// List occupants of one room, in registration order.
pub async fn list_by_room(db: &Database, room: u32) -> Result<Vec<Occupant>, RentioError> {
    db.connection()
        .call(move |conn| -> Result<Vec<Occupant>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {OCCUPANT_COLUMNS} FROM occupants WHERE room = ?1 ORDER BY id ASC"
            ))?;
            let rows = stmt.query_map(params![room], row_to_occupant)?;
            let mut occupants = Vec::new();
            for row in rows {
                occupants.push(row?);
            }
            Ok(occupants)
        })
        .await
        .map_err(map_tr_err)
}

/// List all occupants, grouped by room.
pub async fn list_all(db: &Database) -> Result<Vec<Occupant>, RentioError> {
    db.connection()
        .call(|conn| -> Result<Vec<Occupant>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {OCCUPANT_COLUMNS} FROM occupants ORDER BY room ASC, id ASC"
            ))?;
            let rows = stmt.query_map([], row_to_occupant)?;
            let mut occupants = Vec::new();
            for row in rows {
                occupants.push(row?);
            }
            Ok(occupants)
        })
        .await
        .map_err(map_tr_err)
}

/// Find the occupant bound to the given contact, if any.
pub async fn find_by_contact(
    db: &Database,
    contact: &Contact,
) -> Result<Option<Occupant>, RentioError> {
    let (user_id, handle) = contact_columns(contact);
    db.connection()
        .call(move |conn| -> Result<Option<Occupant>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {OCCUPANT_COLUMNS} FROM occupants
                 WHERE (?1 IS NOT NULL AND user_id = ?1) OR (?2 IS NOT NULL AND handle = ?2)"
            ))?;
            match stmt.query_row(params![user_id, handle], row_to_occupant) {
                Ok(occ) => Ok(Some(occ)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Apply a partial profile update. Changing the contact re-checks uniqueness
/// against every other occupant.
pub async fn update(
    db: &Database,
    id: i64,
    update: &OccupantUpdate,
) -> Result<(), RentioError> {
    let update = update.clone();
    db.connection()
        .call(move |conn| -> Result<Result<(), RentioError>, rusqlite::Error> {
            let tx = conn.transaction()?;

            let exists: i64 = tx.query_row(
                "SELECT COUNT(*) FROM occupants WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )?;
            if exists == 0 {
                return Ok(Err(RentioError::NotFound { occupant: id }));
            }

            if let Some(name) = &update.name {
                tx.execute(
                    "UPDATE occupants SET name = ?1 WHERE id = ?2",
                    params![name, id],
                )?;
            }
            if let Some(phone) = &update.phone {
                tx.execute(
                    "UPDATE occupants SET phone = ?1 WHERE id = ?2",
                    params![phone, id],
                )?;
            }
            if let Some(document_ref) = &update.document_ref {
                tx.execute(
                    "UPDATE occupants SET document_ref = ?1 WHERE id = ?2",
                    params![document_ref, id],
                )?;
            }
            if let Some(contact) = &update.contact {
                if contact_taken(&tx, contact, Some(id))? {
                    return Ok(Err(RentioError::DuplicateContact {
                        contact: contact.to_string(),
                    }));
                }
                let (user_id, handle) = contact_columns(contact);
                tx.execute(
                    "UPDATE occupants SET user_id = ?1, handle = ?2 WHERE id = ?3",
                    params![user_id, handle, id],
                )?;
            }

            tx.commit()?;
            Ok(Ok(()))
        })
        .await
        .map_err(map_tr_err)?
}

/// Remove an occupant from the roster. Ledger rows are left in place.
pub async fn delete(db: &Database, id: i64) -> Result<(), RentioError> {
    let removed = db
        .connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute("DELETE FROM occupants WHERE id = ?1", params![id])
        })
        .await
        .map_err(map_tr_err)?;
    if removed == 0 {
        return Err(RentioError::NotFound { occupant: id });
    }
    Ok(())
}

/// One-way handle reconciliation: if an occupant is registered under this
/// handle and has no numeric identity yet, bind the numeric identity and
/// drop the handle. A no-op when the handle is unknown, already bound, or
/// the numeric identity belongs to someone else.
pub async fn bind_contact_if_unbound(
    db: &Database,
    handle: &str,
    user_id: i64,
) -> Result<(), RentioError> {
    let handle = handle.to_ascii_lowercase();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "UPDATE occupants SET user_id = ?2, handle = NULL
                 WHERE handle = ?1
                   AND user_id IS NULL
                   AND NOT EXISTS (SELECT 1 FROM occupants WHERE user_id = ?2)",
                params![handle, user_id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn make_new(room: u32, name: &str, contact: Contact) -> NewOccupant {
        NewOccupant {
            room,
            name: name.to_string(),
            contact,
            phone: Some("+998901234567".to_string()),
            document_ref: None,
        }
    }

    #[tokio::test]
    async fn create_and_get_roundtrips() {
        let (db, _dir) = setup_db().await;
        let id = create(&db, &make_new(3, "Ali", Contact::UserId(100)), 4)
            .await
            .unwrap();

        let occ = get(&db, id).await.unwrap();
        assert_eq!(occ.room, 3);
        assert_eq!(occ.name, "Ali");
        assert_eq!(occ.user_id, Some(100));
        assert_eq!(occ.handle, None);
        assert_eq!(occ.paid_until, None);
        assert_eq!(occ.accrued_total, 0);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn get_missing_returns_not_found() {
        let (db, _dir) = setup_db().await;
        let err = get(&db, 999).await.unwrap_err();
        assert!(matches!(err, RentioError::NotFound { occupant: 999 }));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn full_room_rejects_registration() {
        let (db, _dir) = setup_db().await;
        for i in 0..4 {
            create(
                &db,
                &make_new(7, &format!("p{i}"), Contact::UserId(100 + i)),
                4,
            )
            .await
            .unwrap();
        }

        let err = create(&db, &make_new(7, "late", Contact::UserId(200)), 4)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RentioError::CapacityExceeded { room: 7, limit: 4 }
        ));

        // Another room is unaffected.
        create(&db, &make_new(8, "ok", Contact::UserId(200)), 4)
            .await
            .unwrap();
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_contact_rejected_across_rooms() {
        let (db, _dir) = setup_db().await;
        create(&db, &make_new(1, "Ali", Contact::Handle("ali".into())), 4)
            .await
            .unwrap();

        let err = create(&db, &make_new(2, "Vali", Contact::Handle("ali".into())), 4)
            .await
            .unwrap_err();
        assert!(matches!(err, RentioError::DuplicateContact { .. }));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn find_by_contact_matches_both_kinds() {
        let (db, _dir) = setup_db().await;
        let by_id = create(&db, &make_new(1, "Ali", Contact::UserId(42)), 4)
            .await
            .unwrap();
        let by_handle = create(&db, &make_new(1, "Vali", Contact::Handle("vali".into())), 4)
            .await
            .unwrap();

        let found = find_by_contact(&db, &Contact::UserId(42)).await.unwrap();
        assert_eq!(found.map(|o| o.id), Some(by_id));

        let found = find_by_contact(&db, &Contact::Handle("vali".into()))
            .await
            .unwrap();
        assert_eq!(found.map(|o| o.id), Some(by_handle));

        let none = find_by_contact(&db, &Contact::UserId(777)).await.unwrap();
        assert!(none.is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn update_changes_only_provided_fields() {
        let (db, _dir) = setup_db().await;
        let id = create(&db, &make_new(1, "Ali", Contact::UserId(42)), 4)
            .await
            .unwrap();

        update(
            &db,
            id,
            &OccupantUpdate {
                name: Some("Aliyev".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let occ = get(&db, id).await.unwrap();
        assert_eq!(occ.name, "Aliyev");
        assert_eq!(occ.user_id, Some(42));
        assert_eq!(occ.phone.as_deref(), Some("+998901234567"));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn update_contact_switches_identity_kind() {
        let (db, _dir) = setup_db().await;
        let id = create(&db, &make_new(1, "Ali", Contact::Handle("ali".into())), 4)
            .await
            .unwrap();

        update(
            &db,
            id,
            &OccupantUpdate {
                contact: Some(Contact::UserId(500)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let occ = get(&db, id).await.unwrap();
        assert_eq!(occ.user_id, Some(500));
        assert_eq!(occ.handle, None);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn update_to_taken_contact_rejected() {
        let (db, _dir) = setup_db().await;
        create(&db, &make_new(1, "Ali", Contact::UserId(1)), 4)
            .await
            .unwrap();
        let other = create(&db, &make_new(1, "Vali", Contact::UserId(2)), 4)
            .await
            .unwrap();

        let err = update(
            &db,
            other,
            &OccupantUpdate {
                contact: Some(Contact::UserId(1)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RentioError::DuplicateContact { .. }));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let (db, _dir) = setup_db().await;
        let id = create(&db, &make_new(1, "Ali", Contact::UserId(42)), 4)
            .await
            .unwrap();
        delete(&db, id).await.unwrap();
        assert!(get(&db, id).await.is_err());

        let err = delete(&db, id).await.unwrap_err();
        assert!(matches!(err, RentioError::NotFound { .. }));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn delete_frees_room_capacity() {
        let (db, _dir) = setup_db().await;
        let mut ids = Vec::new();
        for i in 0..2 {
            ids.push(
                create(&db, &make_new(5, &format!("p{i}"), Contact::UserId(i)), 2)
                    .await
                    .unwrap(),
            );
        }
        assert!(create(&db, &make_new(5, "late", Contact::UserId(99)), 2)
            .await
            .is_err());

        delete(&db, ids[0]).await.unwrap();
        create(&db, &make_new(5, "late", Contact::UserId(99)), 2)
            .await
            .unwrap();
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn bind_contact_binds_unbound_handle() {
        let (db, _dir) = setup_db().await;
        let id = create(&db, &make_new(1, "Ali", Contact::Handle("ali".into())), 4)
            .await
            .unwrap();

        bind_contact_if_unbound(&db, "Ali", 42).await.unwrap();

        let occ = get(&db, id).await.unwrap();
        assert_eq!(occ.user_id, Some(42));
        assert_eq!(occ.handle, None);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn bind_contact_is_silent_noop_when_id_taken() {
        let (db, _dir) = setup_db().await;
        create(&db, &make_new(1, "Owner", Contact::UserId(42)), 4)
            .await
            .unwrap();
        let id = create(&db, &make_new(1, "Ali", Contact::Handle("ali".into())), 4)
            .await
            .unwrap();

        bind_contact_if_unbound(&db, "ali", 42).await.unwrap();

        let occ = get(&db, id).await.unwrap();
        assert_eq!(occ.user_id, None);
        assert_eq!(occ.handle.as_deref(), Some("ali"));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn bind_contact_unknown_handle_is_noop() {
        let (db, _dir) = setup_db().await;
        bind_contact_if_unbound(&db, "ghost", 42).await.unwrap();
        assert!(list_all(&db).await.unwrap().is_empty());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_all_groups_by_room() {
        let (db, _dir) = setup_db().await;
        create(&db, &make_new(9, "c", Contact::UserId(3)), 4)
            .await
            .unwrap();
        create(&db, &make_new(2, "a", Contact::UserId(1)), 4)
            .await
            .unwrap();
        create(&db, &make_new(2, "b", Contact::UserId(2)), 4)
            .await
            .unwrap();

        let all = list_all(&db).await.unwrap();
        let rooms: Vec<u32> = all.iter().map(|o| o.room).collect();
        assert_eq!(rooms, vec![2, 2, 9]);

        let room_two = list_by_room(&db, 2).await.unwrap();
        assert_eq!(room_two.len(), 2);
        assert_eq!(room_two[0].name, "a");
        db.close().await.unwrap();
    }
}
