//! Turns noisy vendor CPU/GPU descriptions into the canonical ids that the
//! benchmark site's "exact full name" search understands.

use lazy_static::lazy_static;

use crate::schemas::laptop::{Laptop, RawLaptop};

/// Words that can occur anywhere in a description, even after the id, and are
/// appended to the id verbatim without affecting the digit-chain structure.
const NON_MEANINGFUL_WORDS: &[&str] = &["pro", "threadripper", "embedded", "ii", "ultra"];

/// Words that are dropped from a CPU description before id detection.
const CPU_REMOVED_WORDS: &[&str] = &["processor"];

/// Words that count as part of the id even though they contain no digits and
/// appear after the first digit-bearing word ("RTX 3060 Ti").
const ALLOWED_WORDS_AFTER_DIGITS: &[&str] = &["ti"];

lazy_static! {
    static ref APPLE_M1_GPU_RE: regex::Regex =
        regex::Regex::new(r"^([0-9]+)-? ?[Cc]ore GPU$").unwrap();
    static ref VRAM_SUFFIX_RE: regex::Regex = regex::Regex::new(r"[0-9]+GB").unwrap();
    static ref GLUED_GTX_RE: regex::Regex = regex::Regex::new(r"GTX([0-9])").unwrap();
}

fn word_contains_digit(word: &str) -> bool {
    word.chars().any(|c| c.is_ascii_digit())
}

fn push_word(id: &mut String, word: &str) {
    if !id.is_empty() {
        id.push(' ');
    }
    id.push_str(word);
}

fn detect_id(device_description: &str, removed_words: &[&str]) -> String {
    // the mix of right-to-left and Latin text on the source sites sometimes
    // moves an opening parenthesis to the very start of the string
    let description = device_description
        .strip_prefix('(')
        .unwrap_or(device_description);

    // only the Latin remainder is meaningful as a search key
    let ascii: String = description.chars().filter(char::is_ascii).collect();

    // read letters, digits, spaces and '-'s until any other character; the
    // rest is trailing descriptive text like "(2.6GHz, 12MB cache)"
    let head: String = ascii
        .chars()
        .take_while(|c| *c == ' ' || *c == '-' || c.is_ascii_alphanumeric())
        .collect();

    // the id always includes a word that contains digits and may span several
    // words. read words until the first digit-bearing word, then keep reading
    // only while the words still carry digits.
    let mut id = String::new();
    let mut seen_digits = false;
    for word in head.split(' ') {
        if word.is_empty() {
            continue;
        }
        let lower = word.to_lowercase();
        if NON_MEANINGFUL_WORDS.contains(&lower.as_str()) {
            push_word(&mut id, word);
            continue;
        }
        if removed_words.contains(&lower.as_str()) {
            continue;
        }

        let has_digit = word_contains_digit(word);
        if has_digit {
            seen_digits = true;
        }
        if seen_digits && !has_digit {
            if ALLOWED_WORDS_AFTER_DIGITS.contains(&lower.as_str()) {
                push_word(&mut id, word);
                continue;
            }
            // a digit-free word after the digit chain is not part of the id
            break;
        }
        push_word(&mut id, word);
    }

    // source sites write "3060Ti" glued together, but the benchmark site's
    // canonical names separate the number and the "Ti"
    if id.ends_with("Ti") && !id.ends_with(" Ti") {
        let glued = id.len() - "Ti".len();
        id = format!("{} Ti", &id[..glued]);
    }

    // one source site injects a spurious "A4" into some AMD device names
    if id.contains("AMD A4 ") {
        id = id.replace("AMD A4 ", "AMD ");
    }

    id
}

pub fn detect_cpu_id(cpu_description: &str) -> String {
    // the apple m1 is listed by vendors under a name the benchmark site
    // doesn't know
    if cpu_description == "M1" {
        return "Apple M1".to_string();
    }

    // some cpu names start with this word, and it ruins the search
    let description = cpu_description
        .strip_prefix("Dual ")
        .unwrap_or(cpu_description);

    detect_id(description, CPU_REMOVED_WORDS)
}

pub fn detect_gpu_id(gpu_description: &str, cpu_description: &str) -> String {
    // apple m1 gpus are described only by their core count ("8-core GPU"),
    // which the generic algorithm can't handle
    if cpu_description == "M1" || cpu_description.starts_with("Apple M1") {
        if let Some(captures) = APPLE_M1_GPU_RE.captures(gpu_description.trim()) {
            return format!("Apple M1 {}", &captures[1]);
        }
    }

    // some sites append the VRAM amount to the gpu's name; everything from
    // the first such pattern on is not part of the name
    let mut description = gpu_description.to_string();
    let vram_start = VRAM_SUFFIX_RE.find(&description).map(|vram| vram.start());
    if let Some(start) = vram_start {
        description.truncate(start);
    }

    // "GTX1650" is written without a space on some sites
    let description = GLUED_GTX_RE.replace_all(&description, "GTX ${1}");

    detect_id(&description, &[])
}

/// The check is currently very simple, but holds for all known examples.
pub fn is_integrated_gpu(gpu_id: &str) -> bool {
    gpu_id.contains("Graphics")
}

/// Replaces a laptop's free-text device descriptions with canonical ids and
/// classifies its GPU as integrated or discrete. A laptop without a GPU
/// description is assumed to use its CPU's integrated GPU.
pub fn detect_laptop_device_ids(raw: RawLaptop) -> Laptop {
    let (gpu, integrated) = match &raw.gpu {
        None => (None, true),
        Some(gpu_description) => {
            let gpu_id = detect_gpu_id(gpu_description, &raw.cpu);
            let integrated = is_integrated_gpu(&gpu_id);
            (Some(gpu_id), integrated)
        }
    };
    Laptop {
        cpu: detect_cpu_id(&raw.cpu),
        gpu,
        integrated,
        url: raw.url,
        brand: raw.brand,
        model: raw.model,
        price: raw.price,
        ram: raw.ram,
        weight: raw.weight,
        image_urls: raw.image_urls,
    }
}
