use anyhow::{Result, bail};
use nomads_game::{decode_to_seed, encode_friendly, generate_code_from_entropy, parse_seed_input};
use std::collections::HashMap;

/// A resolved seed plus the share code it was given as, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedInfo {
    pub seed: u64,
    pub code: Option<String>,
}

impl SeedInfo {
    #[must_use]
    pub const fn from_numeric(seed: u64) -> Self {
        Self { seed, code: None }
    }

    #[must_use]
    pub const fn from_share_code(seed: u64, code: String) -> Self {
        Self {
            seed,
            code: Some(code),
        }
    }

    /// The code a player would type to replay this seed.
    #[must_use]
    pub fn share_code(&self) -> String {
        self.code
            .clone()
            .unwrap_or_else(|| encode_friendly(self.seed))
    }
}

/// Resolve CLI seed tokens into canonical seeds.
///
/// Accepts decimal or `0x` hex integers, share codes such as `NM-MESA42`,
/// `all` (every share code) and `random` (one fresh share code).
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<SeedInfo>> {
    let mut pending: Vec<SeedInfo> = Vec::new();
    let mut request_all = false;

    for token in tokens {
        if token.is_empty() {
            continue;
        }

        if token.eq_ignore_ascii_case("all") || token.eq_ignore_ascii_case("available") {
            request_all = true;
            continue;
        }

        if token.eq_ignore_ascii_case("random") {
            let code = generate_code_from_entropy(rand::random::<u64>());
            if let Some(seed) = decode_to_seed(&code) {
                pending.push(SeedInfo::from_share_code(seed, code));
            }
            continue;
        }

        if let Ok(value) = token.parse::<i64>() {
            pending.push(SeedInfo::from_numeric(value.unsigned_abs()));
            continue;
        }

        if let Some(seed) = decode_to_seed(token) {
            pending.push(SeedInfo::from_share_code(seed, token.to_uppercase()));
            continue;
        }

        if let Some(seed) = parse_seed_input(token) {
            pending.push(SeedInfo::from_numeric(seed));
            continue;
        }

        bail!("Unrecognized seed token: {token}");
    }

    if request_all {
        pending.extend(all_share_code_seeds());
    }

    let mut deduped: Vec<SeedInfo> = Vec::new();
    let mut index: HashMap<u64, usize> = HashMap::new();

    for info in pending {
        if let Some(&existing) = index.get(&info.seed) {
            if let Some(entry) = deduped.get_mut(existing)
                && entry.code.is_none()
                && info.code.is_some()
            {
                *entry = info;
            }
        } else {
            index.insert(info.seed, deduped.len());
            deduped.push(info);
        }
    }

    if deduped.is_empty() {
        deduped.push(SeedInfo::from_numeric(1337));
    }

    Ok(deduped)
}

fn all_share_code_seeds() -> Vec<SeedInfo> {
    use nomads_game::seed::WORD_LIST;

    let mut seeds = Vec::with_capacity(WORD_LIST.len() * 100);
    for word in WORD_LIST {
        for suffix in 0..100 {
            let code = format!("NM-{word}{suffix:02}");
            if let Some(seed) = decode_to_seed(&code) {
                seeds.push(SeedInfo::from_share_code(seed, code));
            }
        }
    }
    seeds
}
