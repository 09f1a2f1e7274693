//! Two-digit NAICS industry sectors used for the `victim.industry2.*` columns.

/// One industry sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Industry {
    pub code: &'static str,
    pub title: &'static str,
    pub short: &'static str,
    pub shorter: &'static str,
}

/// Code used for records whose industry is missing or not a known sector.
pub const UNKNOWN_INDUSTRY: &str = "00";

const fn sector(
    code: &'static str,
    title: &'static str,
    short: &'static str,
    shorter: &'static str,
) -> Industry {
    Industry {
        code,
        title,
        short,
        shorter,
    }
}

pub const INDUSTRIES: [Industry; 25] = [
    sector("00", "Unknown", "Unknown", "Unknown"),
    sector("11", "Agriculture, Forestry, Fishing and Hunting", "Agriculture (11)", "Agriculture"),
    sector("21", "Mining", "Mining (21)", "Mining"),
    sector("22", "Utilities", "Utilities (22)", "Utilities"),
    sector("23", "Construction", "Construction (23)", "Construction"),
    sector("31", "Manufacturing", "Manufacturing (31)", "Manufacturing"),
    sector("32", "Manufacturing", "Manufacturing (32)", "Manufacturing"),
    sector("33", "Manufacturing", "Manufacturing (33)", "Manufacturing"),
    sector("42", "Wholesale Trade", "Trade (42)", "Trade"),
    sector("44", "Retail Trade", "Retail (44)", "Retail"),
    sector("45", "Retail Trade", "Retail (45)", "Retail"),
    sector("48", "Transportation and Warehousing", "Transportation (48)", "Transportation"),
    sector("49", "Transportation and Warehousing", "Transportation (49)", "Transportation"),
    sector("51", "Information", "Information (51)", "Information"),
    sector("52", "Finance and Insurance", "Finance (52)", "Finance"),
    sector("53", "Real Estate Rental and Leasing", "Real Estate (53)", "Real Estate"),
    sector(
        "54",
        "Professional, Scientific, and Technical Services",
        "Professional (54)",
        "Professional",
    ),
    sector("55", "Management of Companies and Enterprises", "Management (55)", "Management"),
    sector(
        "56",
        "Administrative and Support and Waste Management and Remediation Services",
        "Administrative (56)",
        "Administrative",
    ),
    sector("61", "Educational Services", "Educational (61)", "Educational"),
    sector("62", "Health Care and Social Assistance", "Healthcare (62)", "Healthcare"),
    sector("71", "Arts, Entertainment, and Recreation", "Entertainment (71)", "Entertainment"),
    sector("72", "Accommodation and Food Services", "Accomodation (72)", "Accomodation"),
    sector(
        "81",
        "Other Services (except Public Administration)",
        "Other Services (81)",
        "Other Services",
    ),
    sector("92", "Public Administration", "Public (92)", "Public"),
];
