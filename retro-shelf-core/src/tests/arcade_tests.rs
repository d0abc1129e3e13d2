use super::*;
use std::collections::HashSet;

#[test]
fn ids_and_short_names_are_unique() {
    let ids: HashSet<u16> = ArcadeSystem::all().iter().map(|a| a.id).collect();
    let names: HashSet<&str> = ArcadeSystem::all().iter().map(|a| a.short_name).collect();
    assert_eq!(ids.len(), ArcadeSystem::all().len());
    assert_eq!(names.len(), ArcadeSystem::all().len());
}

#[test]
fn lookup_by_short_name_ignores_case() {
    let cps2 = ArcadeSystem::by_short_name("CPS2").unwrap();
    assert_eq!(cps2.id, 7);
    assert_eq!(cps2.to_string(), "CPS-2");
    assert!(ArcadeSystem::by_short_name("nope").is_none());
}

#[test]
fn lookup_by_id() {
    assert_eq!(ArcadeSystem::by_id(149).unwrap().short_name, "seta");
    assert!(ArcadeSystem::by_id(1).is_none());
}
