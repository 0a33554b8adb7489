//! Contact storage: add, list, remove, and reorder emergency contacts.
//!
//! Order is explicit in the `position` column. The contact at the lowest
//! position is the primary.

use rusqlite::{Connection, OptionalExtension};
use uuid::Uuid;

use crate::model::Contact;

use super::{Result, Storage, StorageError};

impl Storage {
    /// Adds a contact at the end of the list.
    pub fn add_contact(&self, name: &str, phone: &str) -> Result<Contact> {
        let conn = self.open_db()?;
        let contact = Contact {
            id: Uuid::new_v4(),
            name: name.to_string(),
            phone: phone.to_string(),
        };
        conn.execute(
            "INSERT INTO contact (id, name, phone, position)
             VALUES (?1, ?2, ?3, (SELECT COALESCE(MAX(position), -1) + 1 FROM contact))",
            rusqlite::params![contact.id.to_string(), &contact.name, &contact.phone],
        )?;
        Ok(contact)
    }

    /// Lists all contacts, primary first.
    pub fn list_contacts(&self) -> Result<Vec<Contact>> {
        let conn = self.open_db()?;
        let mut stmt = conn.prepare("SELECT id, name, phone FROM contact ORDER BY position")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut contacts = Vec::new();
        for row in rows {
            let (id, name, phone) = row?;
            let id = id
                .parse::<Uuid>()
                .map_err(|e| StorageError::Corrupt(format!("invalid contact id: {e}")))?;
            contacts.push(Contact { id, name, phone });
        }
        Ok(contacts)
    }

    /// Removes a contact.
    pub fn remove_contact(&self, id: Uuid) -> Result<()> {
        let conn = self.open_db()?;
        let rows = conn.execute(
            "DELETE FROM contact WHERE id = ?1",
            rusqlite::params![id.to_string()],
        )?;
        if rows == 0 {
            return Err(StorageError::ContactNotFound(id));
        }
        Ok(())
    }

    /// Moves a contact to the front of the list, making it the primary.
    ///
    /// Contacts that were ahead of it shift back by one.
    pub fn promote_contact(&self, id: Uuid) -> Result<()> {
        let mut conn = self.open_db()?;
        let tx = conn.transaction()?;
        let Some(position) = contact_position(&tx, id)? else {
            return Err(StorageError::ContactNotFound(id));
        };
        tx.execute(
            "UPDATE contact SET position = position + 1 WHERE position < ?1",
            rusqlite::params![position],
        )?;
        tx.execute(
            "UPDATE contact SET position = 0 WHERE id = ?1",
            rusqlite::params![id.to_string()],
        )?;
        tx.commit()?;
        Ok(())
    }
}

fn contact_position(conn: &Connection, id: Uuid) -> Result<Option<i64>> {
    Ok(conn
        .query_row(
            "SELECT position FROM contact WHERE id = ?1",
            rusqlite::params![id.to_string()],
            |row| row.get(0),
        )
        .optional()?)
}
