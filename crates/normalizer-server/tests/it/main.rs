mod support;

mod curie_prefixes;
mod health;
mod normalize;
mod query;
mod setid;
