use std::collections::BTreeMap;

/// Index entities by display name.
///
/// Names are expected to be unique on a hub. When they are not, the entity
/// that comes later in `entities` replaces the earlier one. Keys compare
/// byte-wise, so "Kitchen" and "kitchen" stay distinct.
pub(crate) fn index_by_name<E>(
    entities: impl IntoIterator<Item = E>,
    name: impl Fn(&E) -> &str,
) -> BTreeMap<String, E> {
    let mut map = BTreeMap::new();
    for entity in entities {
        map.insert(name(&entity).to_string(), entity);
    }
    map
}
