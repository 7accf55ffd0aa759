//! Per-tag entity variants.
//!
//! A [`VariantRegistry`] maps tag names to constructors that take over
//! mapping for that tag. The registry is assembled at start-up and handed to
//! the [`ResponseMapper`]; it is never mutated afterwards. The standard
//! registry marks `<user>` and `<photo>`-like elements so callers can reach
//! the [`User`] and [`Photo`] views with their follow-up calls.

use std::collections::HashMap;
use std::fmt;

use futures::stream::BoxStream;

use crate::client::{Client, Session};
use crate::entity::{Entity, Response, Variant};
use crate::error::{Error, Result};
use crate::mapper::ResponseMapper;
use crate::method::Args;
use crate::node::Node;

/// Builds the entity for one element; may delegate to
/// [`ResponseMapper::structured`] for the default shape
pub type VariantConstructor = fn(&ResponseMapper, &Session, &Node) -> Result<Entity>;

/// Remote error code for "photo has no location information"
const NO_LOCATION_CODE: &str = "2";

#[derive(Clone)]
pub struct VariantRegistry {
    constructors: HashMap<String, VariantConstructor>,
}

impl VariantRegistry {
    pub fn empty() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    pub fn standard() -> Self {
        Self::empty()
            .register(&["user"], user)
            .register(&["photo", "prevphoto", "nextphoto"], photo)
    }

    pub fn register(mut self, tags: &[&str], constructor: VariantConstructor) -> Self {
        for tag in tags {
            self.constructors.insert(tag.to_string(), constructor);
        }
        self
    }

    pub fn get(&self, tag: &str) -> Option<VariantConstructor> {
        self.constructors.get(tag).copied()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.constructors.contains_key(tag)
    }
}

impl Default for VariantRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for VariantRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<_> = self.constructors.keys().collect();
        tags.sort();
        f.debug_struct("VariantRegistry").field("tags", &tags).finish()
    }
}

fn user(mapper: &ResponseMapper, session: &Session, node: &Node) -> Result<Entity> {
    Ok(mapper
        .structured(session, node)?
        .with_variant(Variant::User)
        .into())
}

fn photo(mapper: &ResponseMapper, session: &Session, node: &Node) -> Result<Entity> {
    Ok(mapper
        .structured(session, node)?
        .with_variant(Variant::Photo)
        .into())
}

impl Response {
    pub fn as_user(&self) -> Option<User<'_>> {
        (self.variant() == Some(&Variant::User)).then_some(User { response: self })
    }

    pub fn as_photo(&self) -> Option<Photo<'_>> {
        (self.variant() == Some(&Variant::Photo)).then_some(Photo { response: self })
    }

    fn required(&self, field: &str) -> Result<&str> {
        self.attr(field).ok_or_else(|| Error::MissingField {
            tag: self.tag().to_string(),
            field: field.to_string(),
        })
    }
}

impl Entity {
    pub fn as_user(&self) -> Option<User<'_>> {
        self.as_response().and_then(Response::as_user)
    }

    pub fn as_photo(&self) -> Option<Photo<'_>> {
        self.as_response().and_then(Response::as_photo)
    }
}

/// View over a `<user>` entity
#[derive(Debug, Clone, Copy)]
pub struct User<'r> {
    response: &'r Response,
}

impl<'r> User<'r> {
    pub fn nsid(&self) -> Option<&'r str> {
        self.response.attr("nsid")
    }

    pub fn response(&self) -> &'r Response {
        self.response
    }

    /// Photos uploaded by this user, across all pages
    pub fn photos<'c>(
        &self,
        client: &'c Client,
        args: Args,
    ) -> Result<BoxStream<'c, Result<Entity>>> {
        let args = args.with("user_id", self.response.required("nsid")?);
        Ok(client.method("photos.search").paginate(args))
    }

    /// Photos this user appears in, across all pages
    pub fn photos_of<'c>(
        &self,
        client: &'c Client,
        args: Args,
    ) -> Result<BoxStream<'c, Result<Entity>>> {
        let args = args.with("user_id", self.response.required("nsid")?);
        Ok(client.method("people.getPhotosOf").paginate(args))
    }
}

/// View over a `<photo>` (or `<prevphoto>`/`<nextphoto>`) entity
#[derive(Debug, Clone, Copy)]
pub struct Photo<'r> {
    response: &'r Response,
}

impl<'r> Photo<'r> {
    pub fn id(&self) -> Option<&'r str> {
        self.response.attr("id")
    }

    pub fn secret(&self) -> Option<&'r str> {
        self.response.attr("secret")
    }

    pub fn response(&self) -> &'r Response {
        self.response
    }

    fn photo_args(&self, with_secret: bool) -> Result<Args> {
        let mut args = Args::new().with("photo_id", self.response.required("id")?);
        if with_secret && let Some(secret) = self.secret() {
            args.set("secret", secret);
        }
        Ok(args)
    }

    /// Full information about this photo
    pub async fn info(&self, client: &Client) -> Result<Entity> {
        let args = self.photo_args(true)?;
        client.method("photos.getInfo").call(args).await
    }

    /// Available sizes of this photo
    pub async fn sizes(&self, client: &Client) -> Result<Entity> {
        let args = self.photo_args(false)?;
        client.method("photos.getSizes").call(args).await
    }

    /// The largest listed size, which the API always lists last
    pub async fn original_size(&self, client: &Client) -> Result<Option<Entity>> {
        let sizes = self.sizes(client).await?;
        Ok(sizes.into_items().pop())
    }

    /// Location of this photo. A photo without location data yields an empty
    /// `<location>` whose coordinates are absent.
    pub async fn geo_data(&self, client: &Client) -> Result<Entity> {
        let args = self.photo_args(true)?;
        match client.method("photos.geo.getLocation").call(args).await {
            Err(Error::Protocol { code, .. }) if code == NO_LOCATION_CODE => {
                Ok(Response::new("location").into())
            }
            result => result,
        }
    }

    /// People tagged in this photo
    pub async fn people(&self, client: &Client) -> Result<Entity> {
        let args = self.photo_args(false)?;
        client.method("photos.people.getList").call(args).await
    }
}
