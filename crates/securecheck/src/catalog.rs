//! The catalog of predefined analytical queries.
//!
//! Each entry pairs a command-line key and a menu description with a literal
//! statement against `traffic_stops`. The result column names listed in
//! `columns` are part of the contract: renderers and exports rely on them.
//!
//! Hours, months and years are extracted with `strftime`, the `SQLite`
//! spelling of `EXTRACT(... FROM ...)`.

use crate::error::{Error, Result};

/// One predefined query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Stable kebab-case identifier used on the command line.
    pub key: &'static str,
    /// Human-readable menu text.
    pub description: &'static str,
    /// The statement sent to the store, verbatim.
    pub statement: &'static str,
    /// Result column names, in order.
    pub columns: &'static [&'static str],
}

/// Age bucket expression shared by the age-based queries.
macro_rules! age_group {
    () => {
        "CASE WHEN driver_age < 18 THEN 'Under 18' \
         WHEN driver_age BETWEEN 18 AND 24 THEN '18-24' \
         WHEN driver_age BETWEEN 25 AND 34 THEN '25-34' \
         WHEN driver_age BETWEEN 35 AND 44 THEN '35-44' \
         WHEN driver_age BETWEEN 45 AND 54 THEN '45-54' \
         ELSE '55+' END"
    };
}

/// Every predefined query, in menu order.
pub const CATALOG: [CatalogEntry; 20] = [
    CatalogEntry {
        key: "top-drug-vehicles",
        description: "Top 10 vehicle numbers involved in drug-related stops",
        statement: "SELECT vehicle_number, COUNT(*) AS drug_stop_count FROM traffic_stops \
                    WHERE drugs_related_stop = 1 GROUP BY vehicle_number \
                    ORDER BY drug_stop_count DESC LIMIT 10;",
        columns: &["vehicle_number", "drug_stop_count"],
    },
    CatalogEntry {
        key: "most-searched-vehicles",
        description: "Vehicles most frequently searched",
        statement: "SELECT vehicle_number, COUNT(*) AS search_count FROM traffic_stops \
                    WHERE search_conducted = 1 GROUP BY vehicle_number \
                    ORDER BY search_count DESC LIMIT 10;",
        columns: &["vehicle_number", "search_count"],
    },
    CatalogEntry {
        key: "age-group-arrest-rate",
        description: "The driver age group which had the highest arrest rate",
        statement: concat!(
            "SELECT ",
            age_group!(),
            " AS age_group, COUNT(*) AS total_stops, \
                    SUM(CASE WHEN is_arrested = TRUE THEN 1 ELSE 0 END) AS arrest_count, \
                    ROUND(SUM(CASE WHEN is_arrested = TRUE THEN 1 ELSE 0 END) * 100.0 / COUNT(*), 2) AS arrest_rate \
                    FROM traffic_stops GROUP BY age_group ORDER BY arrest_rate DESC LIMIT 1;"
        ),
        columns: &["age_group", "total_stops", "arrest_count", "arrest_rate"],
    },
    CatalogEntry {
        key: "gender-by-country",
        description: "Gender distribution of drivers that are stopped in each country",
        statement: "SELECT country_name, driver_gender, COUNT(*) AS stop_count FROM traffic_stops \
                    GROUP BY country_name, driver_gender ORDER BY country_name, driver_gender;",
        columns: &["country_name", "driver_gender", "stop_count"],
    },
    CatalogEntry {
        key: "race-gender-search-rate",
        description: "The race and gender combination that has the highest search rate",
        statement: "SELECT driver_race, driver_gender, COUNT(*) AS total_stops, \
                    SUM(search_conducted) AS searches, \
                    ROUND(SUM(search_conducted) * 100.0 / COUNT(*), 2) AS search_rate \
                    FROM traffic_stops GROUP BY driver_race, driver_gender \
                    ORDER BY search_rate DESC LIMIT 1;",
        columns: &["driver_race", "driver_gender", "total_stops", "searches", "search_rate"],
    },
    CatalogEntry {
        key: "busiest-hour",
        description: "The time of day that sees the most traffic stops",
        statement: "SELECT CAST(strftime('%H', stop_time) AS INTEGER) AS hour_of_day, \
                    COUNT(*) AS stop_count FROM traffic_stops \
                    GROUP BY hour_of_day ORDER BY stop_count DESC LIMIT 1;",
        columns: &["hour_of_day", "stop_count"],
    },
    CatalogEntry {
        key: "duration-by-violation",
        description: "The average stop duration for different violations",
        statement: "SELECT violation, ROUND(AVG(stop_duration), 2) AS avg_duration \
                    FROM traffic_stops GROUP BY violation ORDER BY avg_duration DESC;",
        columns: &["violation", "avg_duration"],
    },
    CatalogEntry {
        key: "night-arrests",
        description: "Are stops during the night more likely to lead to arrests?",
        statement: "SELECT CASE WHEN \
                    (SELECT SUM(is_arrested) FROM traffic_stops \
                     WHERE CAST(strftime('%H', stop_time) AS INTEGER) BETWEEN 19 AND 23 \
                     OR CAST(strftime('%H', stop_time) AS INTEGER) BETWEEN 0 AND 5) > \
                    (SELECT SUM(is_arrested) FROM traffic_stops \
                     WHERE CAST(strftime('%H', stop_time) AS INTEGER) BETWEEN 6 AND 18) \
                    THEN 'Yes' ELSE 'No' END AS night_more_arrests;",
        columns: &["night_more_arrests"],
    },
    CatalogEntry {
        key: "violations-search-arrest",
        description: "Violations that are most associated with searches or arrests",
        statement: "SELECT violation, COUNT(*) AS total_stops, SUM(search_conducted) AS searches, \
                    SUM(is_arrested) AS arrests FROM traffic_stops GROUP BY violation \
                    ORDER BY SUM(search_conducted) + SUM(is_arrested) DESC;",
        columns: &["violation", "total_stops", "searches", "arrests"],
    },
    CatalogEntry {
        key: "young-driver-violations",
        description: "Violations that are most common among younger drivers (<25)",
        statement: "SELECT violation, COUNT(*) AS stop_count FROM traffic_stops \
                    WHERE driver_age < 25 GROUP BY violation ORDER BY stop_count DESC;",
        columns: &["violation", "stop_count"],
    },
    CatalogEntry {
        key: "rare-search-arrest",
        description: "Is there a violation that rarely results in search or arrest?",
        statement: "SELECT CASE WHEN EXISTS (SELECT 1 FROM traffic_stops GROUP BY violation \
                    HAVING SUM(search_conducted) + SUM(is_arrested) < 0.05 * COUNT(*)) \
                    THEN 'Yes' ELSE 'No' END AS rarely_results_in_search_or_arrest;",
        columns: &["rarely_results_in_search_or_arrest"],
    },
    CatalogEntry {
        key: "country-drug-rate",
        description: "Countries that report the highest rate of drug-related stops",
        statement: "SELECT country_name, COUNT(*) AS total_stops, \
                    SUM(drugs_related_stop) AS drug_stops, \
                    ROUND(SUM(drugs_related_stop) * 100.0 / COUNT(*), 2) AS drug_stop_rate \
                    FROM traffic_stops GROUP BY country_name ORDER BY drug_stop_rate DESC;",
        columns: &["country_name", "total_stops", "drug_stops", "drug_stop_rate"],
    },
    CatalogEntry {
        key: "arrest-rate-country-violation",
        description: "Arrest rate by country and violation",
        statement: "SELECT country_name, violation, COUNT(*) AS total_stops, \
                    SUM(is_arrested) AS arrests, \
                    ROUND(SUM(is_arrested) * 100.0 / COUNT(*), 2) AS arrest_rate \
                    FROM traffic_stops GROUP BY country_name, violation ORDER BY arrest_rate DESC;",
        columns: &["country_name", "violation", "total_stops", "arrests", "arrest_rate"],
    },
    CatalogEntry {
        key: "country-most-searches",
        description: "Country that has the most stops with search conducted",
        statement: "SELECT country_name, COUNT(*) AS total_stops, \
                    SUM(search_conducted) AS search_stops FROM traffic_stops \
                    GROUP BY country_name ORDER BY search_stops DESC LIMIT 1;",
        columns: &["country_name", "total_stops", "search_stops"],
    },
    CatalogEntry {
        key: "yearly-by-country",
        description: "Yearly Breakdown of Stops and Arrests by Country",
        statement: "SELECT DISTINCT country_name, year, \
                    COUNT(*) OVER (PARTITION BY country_name, year) AS total_stops, \
                    SUM(is_arrested) OVER (PARTITION BY country_name, year) AS arrests \
                    FROM (SELECT country_name, CAST(strftime('%Y', stop_date) AS INTEGER) AS year, \
                    is_arrested FROM traffic_stops) AS sub ORDER BY country_name, year;",
        columns: &["country_name", "year", "total_stops", "arrests"],
    },
    CatalogEntry {
        key: "violations-by-age-race",
        description: "Driver Violation Trends Based on Age and Race",
        statement: concat!(
            "SELECT a.driver_race, b.age_group, a.violation, COUNT(*) AS stop_count \
             FROM traffic_stops a JOIN (SELECT id, ",
            age_group!(),
            " AS age_group FROM traffic_stops) b ON a.id = b.id \
             GROUP BY a.driver_race, b.age_group, a.violation \
             ORDER BY a.driver_race, b.age_group, stop_count DESC;"
        ),
        columns: &["driver_race", "age_group", "violation", "stop_count"],
    },
    CatalogEntry {
        key: "time-periods",
        description: "Time Period Analysis of Stops (Year, Month, Hour)",
        statement: "SELECT a.year, a.month, a.hour, COUNT(*) AS stop_count \
                    FROM traffic_stops b JOIN (SELECT id, \
                    CAST(strftime('%Y', stop_date) AS INTEGER) AS year, \
                    CAST(strftime('%m', stop_date) AS INTEGER) AS month, \
                    CAST(strftime('%H', stop_time) AS INTEGER) AS hour \
                    FROM traffic_stops) a ON a.id = b.id \
                    GROUP BY a.year, a.month, a.hour ORDER BY a.year, a.month, a.hour;",
        columns: &["year", "month", "hour", "stop_count"],
    },
    CatalogEntry {
        key: "violation-search-arrest-rates",
        description: "Violations with High Search and Arrest Rates",
        statement: "SELECT DISTINCT violation, \
                    COUNT(*) OVER (PARTITION BY violation) AS total_stops, \
                    SUM(search_conducted) OVER (PARTITION BY violation) AS searches, \
                    SUM(is_arrested) OVER (PARTITION BY violation) AS arrests, \
                    ROUND(SUM(search_conducted) OVER (PARTITION BY violation) * 100.0 / \
                    COUNT(*) OVER (PARTITION BY violation), 2) AS search_rate, \
                    ROUND(SUM(is_arrested) OVER (PARTITION BY violation) * 100.0 / \
                    COUNT(*) OVER (PARTITION BY violation), 2) AS arrest_rate \
                    FROM traffic_stops ORDER BY search_rate DESC, arrest_rate DESC;",
        columns: &["violation", "total_stops", "searches", "arrests", "search_rate", "arrest_rate"],
    },
    CatalogEntry {
        key: "demographics-by-country",
        description: "Driver Demographics by Country (Age, Gender, and Race)",
        statement: "SELECT country_name, driver_gender, driver_race, \
                    ROUND(AVG(driver_age), 1) AS avg_age, COUNT(*) AS stop_count \
                    FROM traffic_stops GROUP BY country_name, driver_gender, driver_race \
                    ORDER BY country_name, driver_gender, driver_race;",
        columns: &["country_name", "driver_gender", "driver_race", "avg_age", "stop_count"],
    },
    CatalogEntry {
        key: "top-arrest-violations",
        description: "Top 5 Violations with Highest Arrest Rates",
        statement: "SELECT violation, COUNT(*) AS total_stops, SUM(is_arrested) AS arrests, \
                    ROUND(SUM(is_arrested) * 100.0 / COUNT(*), 2) AS arrest_rate \
                    FROM traffic_stops GROUP BY violation ORDER BY arrest_rate DESC LIMIT 5;",
        columns: &["violation", "total_stops", "arrests", "arrest_rate"],
    },
];

/// Look up an entry by key.
///
/// # Errors
///
/// Returns [`Error::UnknownQuery`] if no entry has that key.
pub fn find(key: &str) -> Result<&'static CatalogEntry> {
    CATALOG
        .iter()
        .find(|entry| entry.key == key)
        .ok_or_else(|| Error::unknown_query(key))
}

/// Look up an entry by its menu description.
#[must_use]
pub fn find_by_description(description: &str) -> Option<&'static CatalogEntry> {
    CATALOG.iter().find(|entry| entry.description == description)
}

/// Resolve a menu selection given either as a key or as the exact menu text.
///
/// # Errors
///
/// Returns [`Error::UnknownQuery`] if neither a key nor a description matches.
pub fn select(selection: &str) -> Result<&'static CatalogEntry> {
    find(selection).or_else(|err| find_by_description(selection).ok_or(err))
}
