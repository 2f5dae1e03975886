//! Typed partial updates.
//!
//! Every PATCH body deserializes into one of these structs. A patch must be
//! turned into a [`Valid`] through `validate()` before the storage layer will
//! accept it, so an empty or malformed patch can never reach SQL.

use serde::{Deserialize, Serialize};
use std::ops::Deref;

use crate::service;
use crate::ServiceError;

/// A patch that passed validation. Only constructible through `validate()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Valid<T>(T);

impl<T> Deref for Valid<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

fn missing_field() -> ServiceError {
    ServiceError::BadRequest("missing field".into())
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    pub image_url: Option<String>,
}

impl UserPatch {
    pub fn validate(self) -> Result<Valid<Self>, ServiceError> {
        let image_url = self.image_url.ok_or_else(missing_field)?;
        Ok(Valid(Self {
            image_url: Some(service::validate_image_url(&image_url)?),
        }))
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupPatch {
    pub name: Option<String>,
}

impl GroupPatch {
    pub fn validate(self) -> Result<Valid<Self>, ServiceError> {
        let name = self.name.ok_or_else(missing_field)?;
        Ok(Valid(Self {
            name: Some(service::validate_group_name(&name)?),
        }))
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BundlePatch {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl BundlePatch {
    pub fn validate(self) -> Result<Valid<Self>, ServiceError> {
        if self.title.is_none() && self.description.is_none() {
            return Err(missing_field());
        }
        Ok(Valid(Self {
            title: self
                .title
                .as_deref()
                .map(service::validate_title)
                .transpose()?,
            description: self
                .description
                .as_deref()
                .map(service::validate_description)
                .transpose()?,
        }))
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardPatch {
    pub question: Option<String>,
    pub answer: Option<String>,
}

impl CardPatch {
    pub fn validate(self) -> Result<Valid<Self>, ServiceError> {
        if self.question.is_none() && self.answer.is_none() {
            return Err(missing_field());
        }
        Ok(Valid(Self {
            question: self
                .question
                .as_deref()
                .map(service::validate_question)
                .transpose()?,
            answer: self
                .answer
                .as_deref()
                .map(service::validate_answer)
                .transpose()?,
        }))
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MemberPatch {
    pub is_admin: Option<bool>,
}

impl MemberPatch {
    pub fn validate(self) -> Result<Valid<Self>, ServiceError> {
        self.is_admin.ok_or_else(missing_field)?;
        Ok(Valid(self))
    }
}
