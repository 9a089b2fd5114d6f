#![allow(dead_code)]

use wellbeing_pca::dataset::RawTable;

pub const HEADER: &str = "FIPS_Code,Region,State_Name,Employed_2020,Median_Household_Income_2020,\
Unemployment_rate_2020,NATURAL_CHG_2020,NET_MIG_2020,GQ_ESTIMATES_BASE_2020,\
Anxiety_Score_2020,Depression_Score_2020,Wellbeing_Score";

pub const MISSING_ID: i64 = 99999;

/// 12 полных строк и одна строка, где все показатели пропущены.
pub fn county_csv() -> String {
    let regions = ["South", "West", "Midwest", "Northeast"];
    let mut lines = vec![HEADER.to_string()];
    for i in 0..12u32 {
        let f = f64::from(i);
        let employed = 1000.0 + 37.0 * f + f64::from((i * i) % 7) * 11.0;
        let income = 40000.0 + 1500.0 * f64::from((i * 5) % 12);
        let unemp = 3.0 + f64::from((i * 3) % 8) * 0.4;
        let nat_chg = f64::from((i * 7) % 13) - 6.0;
        let net_mig = f64::from((i * 11) % 17) * 3.0 - 20.0;
        let gq = 200.0 + f64::from((i * 13) % 19) * 9.0;
        let anxiety = 20.0 + f64::from((i * 5) % 9) * 1.5;
        let depression = 18.0 + f64::from((i * 4) % 7) * 2.0;
        let wellbeing = 50.0 + f;
        lines.push(format!(
            "{},{},State{},{},{},{},{},{},{},{},{},{}",
            1001 + 2 * i,
            regions[i as usize % 4],
            i,
            employed,
            income,
            unemp,
            nat_chg,
            net_mig,
            gq,
            anxiety,
            depression,
            wellbeing
        ));
    }
    lines.push(format!("{MISSING_ID},West,Nowhere,,,,,,,,,"));
    lines.join("\n") + "\n"
}

pub fn county_table() -> RawTable {
    RawTable::from_reader(county_csv().as_bytes()).expect("fixture parses")
}
