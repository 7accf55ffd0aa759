//! Remote method paths and call arguments.
//!
//! A [`Method`] is an uninvoked reference to a remote procedure such as
//! `flickr.people.getInfo`. Appending a segment returns a new path and never
//! touches the network; [`Method::call`] performs exactly one request.

use std::collections::BTreeMap;
use std::fmt;

use futures::stream::BoxStream;

use crate::client::Client;
use crate::entity::Entity;
use crate::error::Result;
use crate::paginator;

/// One argument value. Lists are sent comma-joined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    Single(String),
    List(Vec<String>),
}

impl ArgValue {
    pub fn into_wire(self) -> String {
        match self {
            ArgValue::Single(value) => value,
            ArgValue::List(values) => values.join(","),
        }
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        ArgValue::Single(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        ArgValue::Single(value)
    }
}

impl From<&String> for ArgValue {
    fn from(value: &String) -> Self {
        ArgValue::Single(value.clone())
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        ArgValue::Single(if value { "1" } else { "0" }.to_string())
    }
}

macro_rules! numeric_arg {
    ($($ty:ty),*) => {
        $(impl From<$ty> for ArgValue {
            fn from(value: $ty) -> Self {
                ArgValue::Single(value.to_string())
            }
        })*
    };
}

numeric_arg!(i32, i64, u32, u64, usize);

/// Floats keep their fractional part on the wire: `1.0` is sent as `"1.0"`.
impl From<f64> for ArgValue {
    fn from(value: f64) -> Self {
        ArgValue::Single(format!("{:?}", value))
    }
}

impl From<Vec<String>> for ArgValue {
    fn from(values: Vec<String>) -> Self {
        ArgValue::List(values)
    }
}

impl From<Vec<&str>> for ArgValue {
    fn from(values: Vec<&str>) -> Self {
        ArgValue::List(values.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for ArgValue {
    fn from(values: &[&str]) -> Self {
        ArgValue::List(values.iter().map(|v| v.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for ArgValue {
    fn from(values: [&str; N]) -> Self {
        ArgValue::List(values.iter().map(|v| v.to_string()).collect())
    }
}

/// Named call arguments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args {
    values: BTreeMap<String, ArgValue>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<ArgValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Wire form: every value a single string, lists comma-joined
    pub fn into_wire(self) -> BTreeMap<String, String> {
        self.values
            .into_iter()
            .map(|(name, value)| (name, value.into_wire()))
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for Args
where
    K: Into<String>,
    V: Into<ArgValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut args = Args::new();
        for (name, value) in iter {
            args.set(name, value);
        }
        args
    }
}

/// A dotted remote method path bound to a client
#[derive(Clone)]
pub struct Method<'c> {
    client: &'c Client,
    segments: Vec<String>,
}

impl<'c> Method<'c> {
    pub(crate) fn new(client: &'c Client, segments: Vec<String>) -> Self {
        Self { client, segments }
    }

    /// New path with one more segment
    pub fn child(&self, segment: impl Into<String>) -> Method<'c> {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Method::new(self.client, segments)
    }

    /// New path with every segment of a dotted name appended
    pub fn path(&self, dotted: &str) -> Method<'c> {
        let mut segments = self.segments.clone();
        segments.extend(
            dotted
                .split('.')
                .filter(|segment| !segment.is_empty())
                .map(str::to_string),
        );
        Method::new(self.client, segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Dot-joined method name as sent on the wire
    pub fn name(&self) -> String {
        self.segments.join(".")
    }

    pub fn client(&self) -> &'c Client {
        self.client
    }

    /// Invoke the method once
    pub async fn call(&self, args: Args) -> Result<Entity> {
        self.client.invoke(&self.name(), args).await
    }

    /// Invoke page after page, yielding every item of every page
    pub fn paginate(&self, args: Args) -> BoxStream<'c, Result<Entity>> {
        paginator::paginate(self.clone(), args)
    }
}

impl fmt::Debug for Method<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Method").field(&self.name()).finish()
    }
}

impl fmt::Display for Method<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}
