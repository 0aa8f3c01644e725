//! Reversible share-code scheme.
//! Code format: NM-<WORD><NN>, e.g., NM-MESA42, NM-JUNIPER07

const PREFIX: &str = "NM";

fn fnv1a64(bytes: &[u8]) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0100_0000_01b3;
    let mut hash = FNV_OFFSET;
    for b in bytes {
        hash = (hash ^ u64::from(*b)).wrapping_mul(FNV_PRIME);
    }
    hash
}

fn sanitize_word(word: &str) -> String {
    word.chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

pub const WORD_LIST: [&str; 64] = [
    "MESA", "JUNIPER", "ARCH", "CANYON", "SLICKRK", "PINYON", "SAGE", "BUTTE", "HOODOO", "WASH",
    "PLAYA", "SALT", "DUNE", "CEDAR", "ASPEN", "ALPINE", "RIDGE", "SUMMIT", "TRAIL", "CAIRN",
    "CAMP", "EMBER", "LANTERN", "STOVE", "KETTLE", "BUNK", "AWNING", "ROOF", "PANEL", "TURBINE",
    "AMPS", "VOLTS", "DIESEL", "PROPANE", "JETBOIL", "STARLNK", "VAN", "BUS", "PRIUS", "CAMPER",
    "SKOOLIE", "RIG", "MILES", "ODOM", "GRAVEL", "WASHBRD", "BORDER", "RANGER", "COYOTE", "RAVEN",
    "LIZARD", "BISON", "ELK", "OWL", "OREO", "PIXEL", "BOWIE", "HAVASU", "ZION", "BRYCE", "MOAB",
    "CAPREEF", "SWELL", "GOBLIN",
];

#[inline]
fn pack(word_index: u16, nn: u8) -> u16 {
    word_index & 0x01FF | ((u16::from(nn) & 0x7F) << 9)
}

#[inline]
fn unpack(packed: u16) -> (u16, u8) {
    (packed & 0x01FF, ((packed >> 9) & 0x7F) as u8)
}

fn compose_seed(word_index: u16, nn: u8) -> u64 {
    let packed = pack(word_index, nn);
    // Domain-separated FNV input
    let mut buf = [0u8; 9];
    buf[..6].copy_from_slice(b"NOMAD-");
    buf[6] = (packed & 0xFF) as u8;
    buf[7] = (packed >> 8) as u8;
    buf[8] = 0x5A;
    let h = fnv1a64(&buf);
    (h & 0xFFFF_FFFF_FFFF_0000) | u64::from(packed)
}

/// Render the low bits of `seed` as a share code.
#[must_use]
pub fn encode_friendly(seed: u64) -> String {
    let packed = (seed & 0xFFFF) as u16;
    let (wi, mut nn) = unpack(packed);
    let word = WORD_LIST
        .get(usize::from(wi))
        .copied()
        .unwrap_or(WORD_LIST[0]);
    if nn > 99 {
        nn %= 100;
    }
    format!("{PREFIX}-{word}{nn:02}")
}

/// Parse a share code back into the seed it stands for.
#[must_use]
pub fn decode_to_seed(code: &str) -> Option<u64> {
    let s = code.trim();
    let (prefix, rest) = s.split_once('-')?;
    if !prefix.eq_ignore_ascii_case(PREFIX) || rest.len() < 3 {
        return None;
    }
    let (word_part, nn_part) = rest.split_at(rest.len() - 2);
    let nn: u8 = nn_part.parse().ok()?;
    let word = sanitize_word(word_part);
    let idx = WORD_LIST.iter().position(|w| sanitize_word(w) == word)?;
    let wi = u16::try_from(idx).ok()?;
    Some(compose_seed(wi, nn))
}

#[must_use]
pub fn generate_code_from_entropy(entropy: u64) -> String {
    let wi = u16::try_from(entropy % WORD_LIST.len() as u64).unwrap_or(0);
    let nn = ((entropy >> 17) % 100) as u8;
    encode_friendly(compose_seed(wi, nn))
}

/// Accept either a share code or a raw decimal/hex seed.
#[must_use]
pub fn parse_seed_input(input: &str) -> Option<u64> {
    let s = input.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        return u64::from_str_radix(hex, 16).ok();
    }
    s.parse::<u64>().ok().or_else(|| decode_to_seed(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_roundtrips_code() {
        let seed = 0xDEAD_BEEF_CAFE_BABE;
        let code = encode_friendly(seed);
        let new_seed = decode_to_seed(&code).unwrap();
        assert_eq!(encode_friendly(new_seed), code);
    }

    #[test]
    fn nm_mesa_42_stable() {
        let seed = decode_to_seed("NM-MESA42").unwrap();
        assert_eq!(encode_friendly(seed), "NM-MESA42");
        assert_eq!(decode_to_seed("nm-mesa42"), Some(seed));
    }

    #[test]
    fn foreign_prefixes_are_rejected() {
        assert!(decode_to_seed("XX-MESA42").is_none());
        assert!(decode_to_seed("NM-NOTAWORD42").is_none());
        assert!(decode_to_seed("NM-M").is_none());
    }

    #[test]
    fn seed_input_accepts_numbers_and_codes() {
        assert_eq!(parse_seed_input("1234"), Some(1234));
        assert_eq!(parse_seed_input("0xff"), Some(255));
        assert_eq!(parse_seed_input("NM-OREO07"), decode_to_seed("NM-OREO07"));
        assert!(parse_seed_input("garbage").is_none());
    }

    #[test]
    fn generated_codes_decode() {
        for entropy in [0_u64, 1, 17, 0xFFFF_FFFF, u64::MAX] {
            let code = generate_code_from_entropy(entropy);
            assert!(decode_to_seed(&code).is_some(), "{code}");
        }
    }
}
