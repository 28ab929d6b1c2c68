use hexworld_shared::api::is_valid_map_size;

pub const DEFAULT_SERVER_PORT: u16 = 3000;
pub const DEFAULT_INITIAL_MAP_SIZE: u32 = 20;
pub const DEFAULT_STATIC_DIR: &str = "client/dist";

/// Upper bound on `radius` for neighbourhood fetches.
pub const MAX_FETCH_RADIUS: u32 = 50;

pub fn server_port() -> u16 {
    std::env::var("HEXWORLD_PORT")
        .ok()
        .and_then(|value| value.trim().parse::<u16>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_SERVER_PORT)
}

/// Bearer token required by the mutating endpoints. Unset or blank leaves
/// them open.
pub fn admin_token() -> Option<String> {
    std::env::var("HEXWORLD_ADMIN_TOKEN")
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn initial_map_size() -> u32 {
    std::env::var("HEXWORLD_INITIAL_MAP_SIZE")
        .ok()
        .and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|value| is_valid_map_size(*value))
        .unwrap_or(DEFAULT_INITIAL_MAP_SIZE)
}

/// Fixed generator seed. Without one every generation draws from the OS.
pub fn map_seed() -> Option<u64> {
    std::env::var("HEXWORLD_SEED")
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
}

pub fn static_dir() -> String {
    std::env::var("HEXWORLD_STATIC_DIR")
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_falls_back_on_garbage() {
        temp_env::with_var("HEXWORLD_PORT", Some("8081"), || {
            assert_eq!(server_port(), 8081);
        });
        temp_env::with_var("HEXWORLD_PORT", Some("0"), || {
            assert_eq!(server_port(), DEFAULT_SERVER_PORT);
        });
        temp_env::with_var("HEXWORLD_PORT", Some("http"), || {
            assert_eq!(server_port(), DEFAULT_SERVER_PORT);
        });
        temp_env::with_var_unset("HEXWORLD_PORT", || {
            assert_eq!(server_port(), DEFAULT_SERVER_PORT);
        });
    }

    #[test]
    fn blank_admin_token_means_open() {
        temp_env::with_var("HEXWORLD_ADMIN_TOKEN", Some("  "), || {
            assert_eq!(admin_token(), None);
        });
        temp_env::with_var("HEXWORLD_ADMIN_TOKEN", Some(" s3cret "), || {
            assert_eq!(admin_token().as_deref(), Some("s3cret"));
        });
    }

    #[test]
    fn initial_map_size_must_be_in_generation_range() {
        temp_env::with_var("HEXWORLD_INITIAL_MAP_SIZE", Some("40"), || {
            assert_eq!(initial_map_size(), 40);
        });
        temp_env::with_var("HEXWORLD_INITIAL_MAP_SIZE", Some("5"), || {
            assert_eq!(initial_map_size(), DEFAULT_INITIAL_MAP_SIZE);
        });
        temp_env::with_var("HEXWORLD_INITIAL_MAP_SIZE", Some("500"), || {
            assert_eq!(initial_map_size(), DEFAULT_INITIAL_MAP_SIZE);
        });
    }

    #[test]
    fn seed_and_static_dir_readers() {
        temp_env::with_vars(
            [
                ("HEXWORLD_SEED", Some("42")),
                ("HEXWORLD_STATIC_DIR", Some("/srv/hexworld")),
            ],
            || {
                assert_eq!(map_seed(), Some(42));
                assert_eq!(static_dir(), "/srv/hexworld");
            },
        );
        temp_env::with_vars_unset(["HEXWORLD_SEED", "HEXWORLD_STATIC_DIR"], || {
            assert_eq!(map_seed(), None);
            assert_eq!(static_dir(), DEFAULT_STATIC_DIR);
        });
    }
}
