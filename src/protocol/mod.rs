//! Built-in protocols
//!
//! Metadata entities share one layout:
//!
//! | field        | code | shape                          |
//! |--------------|------|--------------------------------|
//! | identifiers  | 0x01 | nested (anidb, imdb, tvdb ...) |
//! | names        | 0x02 | scalar                         |
//! | supplemental | 0x11 | nested                         |
//! | parameters   | 0x12 | nested, when the entity has any|
//! | children     | 0x21 | repeated child entity          |
//!
//! Each tree is built on first use and shared for the life of the process.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::schema::{KeyCode, MountOptions, SchemaBuilder, SchemaResult, SchemaTree, SchemaVersion};

/// Version of every built-in protocol
pub const PROTOCOL_VERSION: SchemaVersion = 0x01;

const IDENTIFIERS: KeyCode = 0x01;
const NAMES: KeyCode = 0x02;
const SUPPLEMENTAL: KeyCode = 0x11;
const PARAMETERS: KeyCode = 0x12;
const CHILDREN: KeyCode = 0x21;

const SERIES_IDENTIFIERS: &[(&str, KeyCode)] = &[("anidb", 0x01), ("imdb", 0x02), ("tvdb", 0x03)];
const MOVIE_IDENTIFIERS: &[(&str, KeyCode)] = &[("anidb", 0x01), ("imdb", 0x02), ("tmdb", 0x04)];
const STUDIO: &[(&str, KeyCode)] = &[("studio", 0x01)];

const SHOW_PARAMETERS: &[(&str, KeyCode)] = &[("default_season", 0x01), ("episode_offset", 0x02)];
const SEASON_PARAMETERS: &[(&str, KeyCode)] = &[("episode_offset", 0x02)];

/// Scope layout of one entity type
struct Entity {
    name: &'static str,
    identifiers: &'static [(&'static str, KeyCode)],
    parameters: &'static [(&'static str, KeyCode)],
    /// Field name holding the repeated child entity
    children: Option<(&'static str, &'static Entity)>,
}

static EPISODE: Entity = Entity {
    name: "episode",
    identifiers: SERIES_IDENTIFIERS,
    parameters: &[],
    children: None,
};

static SEASON: Entity = Entity {
    name: "season",
    identifiers: SERIES_IDENTIFIERS,
    parameters: SEASON_PARAMETERS,
    children: Some(("episodes", &EPISODE)),
};

static SHOW: Entity = Entity {
    name: "show",
    identifiers: SERIES_IDENTIFIERS,
    parameters: SHOW_PARAMETERS,
    children: Some(("seasons", &SEASON)),
};

static MOVIE: Entity = Entity {
    name: "movie",
    identifiers: MOVIE_IDENTIFIERS,
    parameters: &[],
    children: None,
};

impl Entity {
    /// Declares this entity and everything below it.
    fn declare(&self, builder: &mut SchemaBuilder, root: bool) -> SchemaResult<()> {
        let mut fields = vec![
            ("identifiers", IDENTIFIERS),
            ("names", NAMES),
            ("supplemental", SUPPLEMENTAL),
        ];
        if !self.parameters.is_empty() {
            fields.push(("parameters", PARAMETERS));
        }
        if let Some((field, _)) = self.children {
            fields.push((field, CHILDREN));
        }

        let version = root.then_some(PROTOCOL_VERSION);
        builder.define(self.name, root, version, fields)?;

        self.declare_section(builder, "identifiers", self.identifiers)?;
        self.declare_section(builder, "supplemental", STUDIO)?;
        if !self.parameters.is_empty() {
            self.declare_section(builder, "parameters", self.parameters)?;
        }

        if let Some((field, child)) = self.children {
            child.declare(builder, false)?;
            builder.mount(self.name, field, child.name, MountOptions::repeated())?;
        }
        Ok(())
    }

    fn declare_section(
        &self,
        builder: &mut SchemaBuilder,
        field: &str,
        keys: &[(&str, KeyCode)],
    ) -> SchemaResult<()> {
        let scope = format!("{}.{}", self.name, field);
        builder.define(&scope, false, None, keys.iter().copied())?;
        builder.mount(self.name, field, &scope, MountOptions::single())
    }

    fn build(&self) -> SchemaResult<SchemaTree> {
        let mut builder = SchemaBuilder::new();
        self.declare(&mut builder, true)?;
        builder.finalize()
    }
}

/// Built-in document types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    Show,
    Season,
    Episode,
    Movie,
}

impl Protocol {
    /// Every built-in protocol
    pub const ALL: [Protocol; 4] = [
        Protocol::Show,
        Protocol::Season,
        Protocol::Episode,
        Protocol::Movie,
    ];

    /// Registry name
    pub fn name(&self) -> &'static str {
        self.entity().name
    }

    fn entity(&self) -> &'static Entity {
        match self {
            Protocol::Show => &SHOW,
            Protocol::Season => &SEASON,
            Protocol::Episode => &EPISODE,
            Protocol::Movie => &MOVIE,
        }
    }

    /// The shared tree of this protocol.
    ///
    /// The first caller builds it; concurrent first callers block until it
    /// is finalized, so nobody observes a partial tree.
    pub fn tree(&self) -> SchemaResult<&'static SchemaTree> {
        static SHOW_TREE: OnceLock<SchemaResult<SchemaTree>> = OnceLock::new();
        static SEASON_TREE: OnceLock<SchemaResult<SchemaTree>> = OnceLock::new();
        static EPISODE_TREE: OnceLock<SchemaResult<SchemaTree>> = OnceLock::new();
        static MOVIE_TREE: OnceLock<SchemaResult<SchemaTree>> = OnceLock::new();

        let cell = match self {
            Protocol::Show => &SHOW_TREE,
            Protocol::Season => &SEASON_TREE,
            Protocol::Episode => &EPISODE_TREE,
            Protocol::Movie => &MOVIE_TREE,
        };
        cell.get_or_init(|| self.entity().build())
            .as_ref()
            .map_err(Clone::clone)
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Protocol::ALL
            .into_iter()
            .find(|protocol| protocol.name() == s)
            .ok_or_else(|| format!("unknown protocol '{}'", s))
    }
}

/// Shared show tree
pub fn show() -> SchemaResult<&'static SchemaTree> {
    Protocol::Show.tree()
}

/// Shared season tree
pub fn season() -> SchemaResult<&'static SchemaTree> {
    Protocol::Season.tree()
}

/// Shared episode tree
pub fn episode() -> SchemaResult<&'static SchemaTree> {
    Protocol::Episode.tree()
}

/// Shared movie tree
pub fn movie() -> SchemaResult<&'static SchemaTree> {
    Protocol::Movie.tree()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::KeyCodec;

    #[test]
    fn test_all_protocols_build() {
        for protocol in Protocol::ALL {
            let tree = protocol.tree().unwrap();
            assert_eq!(tree.name(), protocol.name());
            assert_eq!(tree.version(), PROTOCOL_VERSION);
        }
    }

    #[test]
    fn test_show_key_table() {
        let tree = show().unwrap();
        let root = tree.root();
        assert_eq!(tree.encode_key(root, "identifiers").unwrap(), 0x01);
        assert_eq!(tree.encode_key(root, "names").unwrap(), 0x02);
        assert_eq!(tree.encode_key(root, "supplemental").unwrap(), 0x11);
        assert_eq!(tree.encode_key(root, "parameters").unwrap(), 0x12);
        assert_eq!(tree.encode_key(root, "seasons").unwrap(), 0x21);

        let ids = tree.scope_id("show.identifiers").unwrap();
        assert_eq!(tree.encode_key(ids, "anidb").unwrap(), 0x01);
        assert_eq!(tree.encode_key(ids, "imdb").unwrap(), 0x02);
        assert_eq!(tree.encode_key(ids, "tvdb").unwrap(), 0x03);

        let supplemental = tree.scope_id("show.supplemental").unwrap();
        assert_eq!(tree.encode_key(supplemental, "studio").unwrap(), 0x01);

        let parameters = tree.scope_id("show.parameters").unwrap();
        assert_eq!(tree.encode_key(parameters, "default_season").unwrap(), 0x01);
        assert_eq!(tree.encode_key(parameters, "episode_offset").unwrap(), 0x02);
    }

    #[test]
    fn test_show_mounts_seasons_and_episodes() {
        let tree = show().unwrap();
        let seasons = tree.child_mount(tree.root(), "seasons").unwrap();
        assert!(seasons.is_repeated());
        assert_eq!(tree.scope_name(seasons.child), "season");

        let episodes = tree.child_mount(seasons.child, "episodes").unwrap();
        assert!(episodes.is_repeated());
        assert_eq!(tree.scope_name(episodes.child), "episode");
    }

    #[test]
    fn test_season_tree_is_its_own_root() {
        let tree = season().unwrap();
        assert_eq!(tree.name(), "season");
        assert!(tree.definition(tree.root()).unwrap().is_root);
        assert!(tree.child_mount(tree.root(), "episodes").is_some());
    }

    #[test]
    fn test_episode_and_movie_have_no_children() {
        let episode = episode().unwrap();
        assert_eq!(episode.mounts(episode.root()).count(), 2);

        let movie = movie().unwrap();
        let ids = movie.scope_id("movie.identifiers").unwrap();
        assert_eq!(movie.encode_key(ids, "tmdb").unwrap(), 0x04);
        assert!(movie.encode_key(movie.root(), "seasons").is_err());
    }

    #[test]
    fn test_tree_is_shared() {
        let first = show().unwrap() as *const SchemaTree;
        let second = Protocol::Show.tree().unwrap() as *const SchemaTree;
        assert_eq!(first, second);
    }

    #[test]
    fn test_parse_protocol() {
        assert_eq!("movie".parse::<Protocol>().unwrap(), Protocol::Movie);
        assert!("anime".parse::<Protocol>().is_err());
        assert_eq!(Protocol::Season.to_string(), "season");
    }
}
