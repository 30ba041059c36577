use std::path;

use super::*;

#[test]
fn test_scratch_dir() {
    let location: &path::Path = "/opt/data/movies.paldb".as_ref();
    let dir = to_scratch_dir(location.as_os_str()).unwrap();
    let dir = path::Path::new(&dir);

    assert_eq!(dir.parent().unwrap(), path::Path::new("/opt/data"));
    let name = dir.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with(".movies.paldb-build-"), "{}", name);

    // two builds never share a scratch directory.
    let other = to_scratch_dir(location.as_os_str()).unwrap();
    assert_ne!(dir.as_os_str(), other.as_os_str());
}

#[test]
fn test_rebuild_location() {
    let location: &path::Path = "/opt/data/movies.paldb".as_ref();
    let loc = to_rebuild_location(location.as_os_str()).unwrap();
    let loc = path::Path::new(&loc);

    assert_eq!(loc.parent().unwrap(), path::Path::new("/opt/data"));
    let name = loc.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with(".movies.paldb-rebuild-"), "{}", name);
}

#[test]
fn test_stream_locations() {
    let dir: &path::Path = "/tmp/.movies-build-x".as_ref();
    let keys = to_keys_location(dir.as_os_str(), 9);
    let data = to_data_location(dir.as_os_str(), 9);
    let slots = to_slots_location(dir.as_os_str(), 9);

    assert!(path::Path::new(&keys).ends_with("keys-9.tmp"));
    assert!(path::Path::new(&data).ends_with("data-9.tmp"));
    assert!(path::Path::new(&slots).ends_with("slots-9.tmp"));
    for loc in [&keys, &data, &slots].iter() {
        assert_eq!(path::Path::new(loc).parent().unwrap(), dir);
    }
}
