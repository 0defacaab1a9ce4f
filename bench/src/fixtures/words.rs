use crate::random::RandomSource;

/// Dictionary used to synthesize memo titles and bodies
pub const DICT_WORDS: &[&str] = &[
    "abandon", "ability", "absence", "academy", "account", "acid", "acorn", "action", "actor",
    "address", "adventure", "advice", "aerial", "agenda", "airport", "alarm", "album", "alley",
    "almond", "alpine", "amber", "anchor", "angle", "animal", "ankle", "answer", "antenna",
    "apple", "april", "arcade", "archive", "arena", "armor", "arrow", "artist", "aspect",
    "atlas", "attic", "august", "autumn", "avenue", "badge", "bakery", "balance", "ballot",
    "bamboo", "banana", "banner", "barrel", "basket", "battery", "beacon", "beetle", "bench",
    "berry", "bicycle", "binder", "biscuit", "blanket", "blossom", "border", "bottle", "boulder",
    "bracket", "branch", "breeze", "bridge", "bronze", "bubble", "bucket", "budget", "buffer",
    "bundle", "butter", "cabin", "cable", "cactus", "camera", "canal", "candle", "canvas",
    "canyon", "carbon", "carpet", "castle", "cavern", "cedar", "cellar", "cement", "census",
    "channel", "chapter", "charter", "cherry", "chimney", "circle", "citrus", "clover", "cobalt",
    "coffee", "column", "comet", "compass", "copper", "coral", "cotton", "county", "crater",
    "crystal", "current", "cursor", "cushion", "custom", "dancer", "dawn", "debate", "decade",
    "delta", "desert", "diamond", "diesel", "dinner", "domain", "donkey", "dragon", "drawer",
    "dune", "eagle", "echo", "eclipse", "editor", "elbow", "element", "ember", "empire",
    "engine", "episode", "equator", "estate", "evening", "fabric", "falcon", "farmer", "feather",
    "fence", "ferry", "fiber", "field", "figure", "filter", "finger", "flame", "flavor",
    "fleet", "flower", "forest", "fossil", "fountain", "fragment", "frost", "galaxy", "garden",
    "garlic", "gateway", "glacier", "glimmer", "granite", "gravel", "guitar", "habit", "hammer",
    "harbor", "harvest", "hazel", "helmet", "heron", "hollow", "horizon", "hunter", "iceberg",
    "idea", "igloo", "impact", "index", "island", "ivory", "jacket", "jaguar", "jasmine",
    "journal", "jungle", "kernel", "kettle", "keyboard", "kitten", "ladder", "lagoon", "lantern",
    "laptop", "lattice", "legend", "lemon", "lens", "letter", "library", "lily", "linen",
    "lizard", "lobster", "locket", "lumber", "magnet", "mango", "maple", "marble", "meadow",
    "melody", "mercury", "meteor", "mirror", "mission", "monitor", "mosaic", "motor", "muffin",
    "museum", "napkin", "nectar", "needle", "network", "nickel", "noodle", "notebook", "nutmeg",
    "oasis", "ocean", "olive", "onion", "orbit", "orchard", "oyster", "paddle", "palace",
    "panda", "parcel", "pebble", "pepper", "pillow", "pilot", "planet", "plaza", "pocket",
    "polar", "pollen", "portal", "potato", "prism", "pulse", "puzzle", "quarry", "quartz",
    "quiver", "rabbit", "radar", "raven", "record", "reef", "ribbon", "ridge", "river",
    "rocket", "saddle", "salmon", "satin", "scarlet", "shadow", "shelter", "signal", "silver",
    "socket", "spiral", "sprout", "summit", "sunset", "switch", "tablet", "temple", "thunder",
    "timber", "tomato", "torch", "tower", "trumpet", "tulip", "tunnel", "umbrella", "valley",
    "velvet", "violet", "voyage", "walnut", "window", "winter", "yellow", "zenith", "zephyr",
];

/// One dictionary word followed by up to nine more, space separated
pub fn random_phrase(words: &[&str], rng: &mut dyn RandomSource) -> String {
    let mut phrase = pick(words, rng).to_string();
    let extra = rng.below(10);
    for _ in 0..extra {
        phrase.push(' ');
        phrase.push_str(pick(words, rng));
    }
    phrase
}

/// Markdown body whose first heading is `title`
pub fn markdown_content(title: &str, words: &[&str], rng: &mut dyn RandomSource) -> String {
    let subtitle = random_phrase(words, rng);
    let items: Vec<String> = (0..3).map(|_| random_phrase(words, rng)).collect();
    let code = random_phrase(words, rng);
    format!(
        "# {title}\n\n## {subtitle}\n\n* {}\n* {}\n* {}\n\n```\n{code}```\n",
        items[0], items[1], items[2]
    )
}

fn pick<'a>(words: &[&'a str], rng: &mut dyn RandomSource) -> &'a str {
    words.get(rng.below(words.len())).copied().unwrap_or("memo")
}
