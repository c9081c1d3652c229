//! Derives name, tags and groups from a raw entry name.
//!
//! Two grammars are tried in order:
//!
//! 1. `<group> @ <name> [<tag>; <tag>; ...]` where the `<group> @ ` prefix is optional
//! 2. `<group> @ <name>`
//!
//! A name matching neither yields empty facets.

use regex::Regex;

use crate::model::Entry;

lazy_static::lazy_static! {
    static ref TAGGED: Regex =
        Regex::new(r"((.+) @ )?(.+) \[(.+)\]").expect("tagged name pattern is valid");
    static ref GROUPED: Regex = Regex::new(r"(.+) @ (.+)").expect("grouped name pattern is valid");
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Facets {
    pub name: String,
    pub tags: Vec<String>,
    pub groups: Vec<String>,
}

pub fn parse(fullname: &str) -> Facets {
    let mut facets = Facets::default();

    if let Some(caps) = TAGGED.captures(fullname) {
        let group = caps.get(2).map_or("", |m| m.as_str());
        facets.groups.push(group.to_string());
        facets.name = caps[3].to_string();
        facets.tags = split_tags(&caps[4]);
    } else if let Some(caps) = GROUPED.captures(fullname) {
        facets.groups.push(caps[1].to_string());
        facets.name = caps[2].to_string();
    }

    // The compound token stays and its parts are appended after it.
    let compound = facets.groups.first().cloned().unwrap_or_default();
    if compound.contains(';') {
        facets.groups.extend(
            compound
                .split([';', ','])
                .map(|part| part.trim().to_string()),
        );
    }

    facets
}

pub fn parse_entry(id: &str, fullname: &str, parent: Option<String>) -> Entry {
    let Facets { name, tags, groups } = parse(fullname);
    Entry {
        id: id.to_string(),
        fullname: fullname.to_string(),
        parent,
        name,
        tags,
        groups,
        category: None,
    }
}

// Repeats are kept: each occurrence counts when scoring.
fn split_tags(list: &str) -> Vec<String> {
    list.split(';').map(|tag| tag.trim().to_string()).collect()
}
