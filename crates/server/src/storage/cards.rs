//! Cards. A question is unique within its bundle.

use flashqudo_api::patch::Valid;
use flashqudo_api::service::{generate_id, NewCard, Paging};
use flashqudo_api::{db, Card, CardPatch};
use rusqlite::{Connection, Row};

use super::{execute, query_all, query_opt, require, Db, StoreError, StoreResult};

fn card_from_row(row: &Row<'_>) -> rusqlite::Result<Card> {
    Ok(Card {
        id: row.get(0)?,
        bundle_id: row.get(1)?,
        question: row.get(2)?,
        answer: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn card_by_id(conn: &Connection, card_id: &str) -> StoreResult<Card> {
    query_opt(conn, &db::cards::get_by_id(card_id), card_from_row)?
        .ok_or(StoreError::NotFound("card"))
}

impl Db {
    pub fn list_bundle_cards(&self, bundle_id: &str, paging: Paging) -> StoreResult<Vec<Card>> {
        require("bundle_id", bundle_id)?;
        let conn = self.conn();
        let built = db::cards::list_for_bundle(bundle_id, paging.limit.into(), paging.offset());
        Ok(query_all(&conn, &built, card_from_row)?)
    }

    pub fn insert_card(&self, bundle_id: &str, card: &NewCard) -> StoreResult<Card> {
        require("bundle_id", bundle_id)?;
        let card_id = generate_id();
        let conn = self.conn();
        execute(
            &conn,
            &db::cards::insert(&card_id, bundle_id, &card.question, &card.answer),
        )
        .map_err(StoreError::on_write("card"))?;
        card_by_id(&conn, &card_id)
    }

    pub fn update_card(&self, card_id: &str, patch: &Valid<CardPatch>) -> StoreResult<Card> {
        require("card_id", card_id)?;
        let conn = self.conn();
        let changed = execute(&conn, &db::cards::update(card_id, patch))
            .map_err(StoreError::on_write("card"))?;
        if changed == 0 {
            return Err(StoreError::NotFound("card"));
        }
        card_by_id(&conn, card_id)
    }

    pub fn delete_card(&self, card_id: &str) -> StoreResult<()> {
        require("card_id", card_id)?;
        let conn = self.conn();
        if execute(&conn, &db::cards::delete(card_id))? == 0 {
            return Err(StoreError::NotFound("card"));
        }
        Ok(())
    }

    /// Remove every card of a bundle, keeping the bundle. Returns the count removed.
    pub fn clear_bundle_cards(&self, bundle_id: &str) -> StoreResult<usize> {
        require("bundle_id", bundle_id)?;
        let conn = self.conn();
        Ok(execute(&conn, &db::cards::delete_for_bundle(bundle_id))?)
    }
}
