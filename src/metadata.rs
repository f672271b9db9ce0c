include!(concat!(env!("OUT_DIR"), "/pkg_info.rs"));
