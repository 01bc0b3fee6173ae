/// An AWS region the interactive prompt can offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub code: &'static str,
    pub label: &'static str,
}

pub const KNOWN_REGIONS: &[Region] = &[
    Region {
        code: "us-east-1",
        label: "North Virginia",
    },
    Region {
        code: "us-east-2",
        label: "Ohio",
    },
    Region {
        code: "us-west-1",
        label: "North California",
    },
    Region {
        code: "us-west-2",
        label: "Oregon",
    },
    Region {
        code: "ca-central-1",
        label: "Central Canada",
    },
    Region {
        code: "ap-south-1",
        label: "Mumbai",
    },
    Region {
        code: "ap-northeast-1",
        label: "Tokyo",
    },
    Region {
        code: "ap-northeast-2",
        label: "Seoul",
    },
    Region {
        code: "ap-southeast-1",
        label: "Singapore",
    },
    Region {
        code: "ap-southeast-2",
        label: "Sydney",
    },
    Region {
        code: "eu-central-1",
        label: "Frankfurt",
    },
    Region {
        code: "eu-west-1",
        label: "Ireland",
    },
    Region {
        code: "eu-west-2",
        label: "London",
    },
    Region {
        code: "sa-east-1",
        label: "Sao Paulo",
    },
];

impl Region {
    pub fn lookup(code: &str) -> Option<&'static Region> {
        KNOWN_REGIONS.iter().find(|r| r.code == code)
    }

    /// Regions to offer in the prompt, in catalogue order.
    ///
    /// `region_list` narrows the catalogue (unknown codes are ignored, and an
    /// effectively empty list means the whole catalogue). Currently selected
    /// regions are always offered.
    pub fn offered(selected: &[String], region_list: &[String]) -> Vec<&'static Region> {
        let curated: Vec<&str> = region_list
            .iter()
            .map(String::as_str)
            .filter(|code| Self::lookup(code).is_some())
            .collect();

        KNOWN_REGIONS
            .iter()
            .filter(|r| {
                curated.is_empty()
                    || curated.contains(&r.code)
                    || selected.iter().any(|s| s == r.code)
            })
            .collect()
    }
}

/// Selected region codes missing from [`KNOWN_REGIONS`], in selection order.
pub fn uncatalogued(selected: &[String]) -> Vec<&str> {
    selected
        .iter()
        .map(String::as_str)
        .filter(|code| !code.trim().is_empty() && Region::lookup(code).is_none())
        .collect()
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code, self.label)
    }
}
