//! Built-in defaults for the site profile, selector vocabularies and identity pool
//!
//! The selector lists go from specific class names to attribute-substring
//! matches to bare tag names. They are guesses about typical catalog markup,
//! not a description of any particular site, and can be overridden per field.

use crate::state::Field;

pub const API_ENDPOINTS: &[&str] = &[
    "/api/brands",
    "/api/cars/brands",
    "/api/vehicles/brands",
    "/api/categories",
    "/api/makes",
];

pub const LISTING_ROOTS: &[&str] = &[
    "/en/used-cars",
    "/en/cars",
    "/en/brands",
    "/en/vehicles",
    "/en/search",
    "/en/catalog",
];

pub const SEED_TEMPLATE: &str = "{base}/en/used-cars/{slug}";

pub const FALLBACK_CATEGORIES: &[&str] = &[
    "alfa-romeo", "audi", "bmw", "chevrolet", "chrysler", "citroen", "dodge", "fiat", "ford",
    "honda", "hyundai", "infiniti", "jaguar", "jeep", "kia", "land-rover", "lexus", "mazda",
    "mercedes-benz", "mini", "mitsubishi", "nissan", "opel", "peugeot", "porsche", "renault",
    "seat", "skoda", "smart", "subaru", "suzuki", "toyota", "volkswagen", "volvo", "acura",
    "bentley", "buick", "cadillac", "daewoo", "daihatsu", "ferrari", "fisker", "gmc", "hummer",
    "isuzu", "lamborghini", "lancia", "lotus", "maserati", "maybach", "mclaren", "oldsmobile",
    "pontiac", "rolls-royce", "saab", "saturn", "scion", "tesla", "vauxhall",
];

pub const LISTING_SELECTORS: &[&str] = &[
    ".car-item",
    ".vehicle-item",
    ".listing-item",
    ".car-card",
    ".vehicle-card",
    ".product-item",
    "a[href*=\"/car/\"]",
    "a[href*=\"/vehicle/\"]",
    "a[href*=\"/product/\"]",
    "[class*=\"car\"]",
    "[class*=\"vehicle\"]",
    "[class*=\"listing\"]",
];

pub const CATEGORY_LINK_SELECTORS: &[&str] = &[
    "a[href*=\"/brand/\"]",
    "a[href*=\"/used-cars/\"]",
    "a[href*=\"/cars/\"]",
    "a[href*=\"/make/\"]",
    ".brand-link",
    ".brand-item a",
    ".brands-list a",
    ".makes-list a",
    "a[href*=\"brand\"]",
    "a[href*=\"make\"]",
];

/// Default query list for a record field
///
/// The brand is never extracted, so it has no queries.
pub fn field_selectors(field: Field) -> &'static [&'static str] {
    match field {
        Field::Brand | Field::Type => &[],
        Field::Model => &[
            "h2",
            "h3",
            "h4",
            ".title",
            ".car-title",
            ".vehicle-title",
            ".model",
            ".car-model",
            ".vehicle-model",
            ".name",
            ".product-name",
            "[class*=\"title\"]",
            "[class*=\"model\"]",
            "[class*=\"name\"]",
        ],
        Field::Year => &[".year", ".car-year", ".model-year", "[class*=\"year\"]"],
        Field::Price => &[
            ".price",
            ".car-price",
            ".vehicle-price",
            ".product-price",
            ".listing-price",
            ".new-car-price",
            "[class*=\"price\"]",
            ".cost",
        ],
        Field::Mileage => &[".mileage", ".km", "[class*=\"mileage\"]", "[class*=\"km\"]"],
        Field::FuelType => &[".fuel", ".fuel-type", "[class*=\"fuel\"]"],
        Field::Transmission => &[
            ".transmission",
            ".transmission-type",
            "[class*=\"transmission\"]",
        ],
        Field::EngineSize => &[".engine", ".engine-size", "[class*=\"engine\"]"],
        Field::Color => &[".color", ".colour", "[class*=\"color\"]"],
        Field::Url => &["a[href]"],
        Field::Description => &[".description", ".desc", "[class*=\"description\"]"],
        Field::Warranty => &[
            ".warranty",
            ".guarantee",
            ".coverage",
            "[class*=\"warranty\"]",
            "[class*=\"guarantee\"]",
        ],
        Field::Features => &[
            ".features",
            ".specs",
            ".specifications",
            "[class*=\"features\"]",
            "[class*=\"specs\"]",
        ],
        Field::SafetyFeatures => &[".safety-features", "[class*=\"safety\"]"],
        Field::TechFeatures => &[".tech-features", ".technology", "[class*=\"tech-\"]"],
        Field::ComfortFeatures => &[".comfort-features", "[class*=\"comfort\"]"],
        Field::DealerLocation => &[".dealer-location", ".location", "[class*=\"location\"]"],
        Field::Availability => &[".availability", ".stock-status", "[class*=\"availability\"]"],
        Field::DeliveryTime => &[".delivery-time", "[class*=\"delivery\"]"],
    }
}

/// Browser identities rotated across fetch attempts
pub const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
];

pub const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.5";
