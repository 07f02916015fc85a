//! Mock department data served by the dashboard endpoints. Derived figures (URGAA
//! metrics, net profit) are computed from the fixtures rather than stored.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Station {
    pub id: &'static str,
    pub name: &'static str,
    pub location: &'static str,
    pub chargers_total: u32,
    pub chargers_active: u32,
    /// `active`, `alert` or `offline`.
    pub status: &'static str,
    pub current_load: f64,
    pub today_sessions: u32,
    /// kWh delivered today.
    pub today_energy: f64,
}

pub fn stations() -> Vec<Station> {
    vec![
        Station {
            id: "ST001",
            name: "URGAA Hub Connaught Place",
            location: "New Delhi",
            chargers_total: 12,
            chargers_active: 10,
            status: "active",
            current_load: 78.5,
            today_sessions: 142,
            today_energy: 2840.0,
        },
        Station {
            id: "ST002",
            name: "URGAA Cyber City",
            location: "Gurugram",
            chargers_total: 8,
            chargers_active: 8,
            status: "active",
            current_load: 91.2,
            today_sessions: 118,
            today_energy: 2210.5,
        },
        Station {
            id: "ST003",
            name: "URGAA Noida Sector 18",
            location: "Noida",
            chargers_total: 6,
            chargers_active: 3,
            status: "alert",
            current_load: 42.0,
            today_sessions: 47,
            today_energy: 860.0,
        },
        Station {
            id: "ST004",
            name: "URGAA Expressway Plaza",
            location: "Jaipur Highway",
            chargers_total: 10,
            chargers_active: 0,
            status: "offline",
            current_load: 0.0,
            today_sessions: 0,
            today_energy: 0.0,
        },
        Station {
            id: "ST005",
            name: "URGAA Whitefield",
            location: "Bengaluru",
            chargers_total: 14,
            chargers_active: 12,
            status: "active",
            current_load: 66.3,
            today_sessions: 156,
            today_energy: 3120.0,
        },
    ]
}

pub fn find_station(id: &str) -> Option<Station> {
    stations().into_iter().find(|s| s.id.eq_ignore_ascii_case(id))
}

/// Tariff used to estimate `revenue_today` from delivered energy.
const RUPEES_PER_KWH: f64 = 18.0;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UrgaaMetrics {
    pub total_stations: usize,
    pub active_stations: usize,
    pub active_sessions: u32,
    pub uptime_percent: f64,
    pub total_energy_mw: f64,
    pub revenue_today: f64,
    pub alerts_count: usize,
}

pub fn urgaa_metrics(stations: &[Station]) -> UrgaaMetrics {
    let chargers_total: u32 = stations.iter().map(|s| s.chargers_total).sum();
    let chargers_active: u32 = stations.iter().map(|s| s.chargers_active).sum();
    let energy_kwh: f64 = stations.iter().map(|s| s.today_energy).sum();
    let uptime_percent = if chargers_total == 0 {
        0.0
    } else {
        (f64::from(chargers_active) / f64::from(chargers_total) * 1000.0).round() / 10.0
    };
    UrgaaMetrics {
        total_stations: stations.len(),
        active_stations: stations.iter().filter(|s| s.status == "active").count(),
        active_sessions: chargers_active,
        uptime_percent,
        total_energy_mw: (energy_kwh / 1000.0 * 100.0).round() / 100.0,
        revenue_today: (energy_kwh * RUPEES_PER_KWH).round(),
        alerts_count: stations.iter().filter(|s| s.status != "active").count(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Course {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub duration_hours: u32,
    /// `Beginner`, `Intermediate` or `Advanced`.
    pub level: &'static str,
    pub modules: u32,
    pub progress: u32,
    pub has_certification: bool,
}

pub fn courses() -> Vec<Course> {
    vec![
        Course {
            id: "C001",
            title: "EV Powertrain Fundamentals",
            description: "Battery packs, motors and inverters for workshop technicians.",
            duration_hours: 12,
            level: "Beginner",
            modules: 8,
            progress: 100,
            has_certification: true,
        },
        Course {
            id: "C002",
            title: "High-Voltage Safety",
            description: "Isolation, PPE and lock-out procedures for HV systems.",
            duration_hours: 6,
            level: "Intermediate",
            modules: 5,
            progress: 60,
            has_certification: true,
        },
        Course {
            id: "C003",
            title: "GST Invoicing for Workshops",
            description: "Job cards, tax lines and compliant invoices.",
            duration_hours: 4,
            level: "Beginner",
            modules: 4,
            progress: 0,
            has_certification: false,
        },
        Course {
            id: "C004",
            title: "DC Fast-Charger Diagnostics",
            description: "Fault codes, firmware and field repair for CCS2 chargers.",
            duration_hours: 16,
            level: "Advanced",
            modules: 10,
            progress: 15,
            has_certification: true,
        },
    ]
}

#[derive(Debug, Clone, Serialize)]
pub struct CurrentCourse {
    pub id: &'static str,
    pub title: &'static str,
    pub progress: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Progress {
    pub current_course: CurrentCourse,
    pub certifications: Vec<&'static str>,
    pub total_hours: u32,
    pub courses_completed: u32,
}

pub fn progress() -> Progress {
    Progress {
        current_course: CurrentCourse {
            id: "C002",
            title: "High-Voltage Safety",
            progress: 60,
        },
        certifications: vec!["EV Powertrain Fundamentals"],
        total_hours: 15,
        courses_completed: 1,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JourneyStage {
    pub stage: &'static str,
    pub customers: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerMetrics {
    pub total_customers: u32,
    pub active_customers: u32,
    pub churn_risk_count: u32,
    pub avg_sentiment: f64,
    pub nps_score: i32,
    pub journey_stages: Vec<JourneyStage>,
}

pub fn customer_metrics() -> CustomerMetrics {
    CustomerMetrics {
        total_customers: 2847,
        active_customers: 2156,
        churn_risk_count: 45,
        avg_sentiment: 0.72,
        nps_score: 48,
        journey_stages: vec![
            JourneyStage { stage: "awareness", customers: 640 },
            JourneyStage { stage: "first_service", customers: 812 },
            JourneyStage { stage: "repeat", customers: 1024 },
            JourneyStage { stage: "loyal", customers: 371 },
        ],
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChurnRisk {
    pub id: &'static str,
    pub name: &'static str,
    /// `high` or `medium`.
    pub risk_level: &'static str,
    pub sentiment: f64,
    pub last_visit_days: u32,
}

pub fn churn_risks() -> Vec<ChurnRisk> {
    vec![
        ChurnRisk { id: "CU1042", name: "Rahul Mehta", risk_level: "high", sentiment: 0.21, last_visit_days: 94 },
        ChurnRisk { id: "CU0877", name: "Anita Sharma", risk_level: "high", sentiment: 0.34, last_visit_days: 71 },
        ChurnRisk { id: "CU1310", name: "Vikram Rao", risk_level: "medium", sentiment: 0.48, last_visit_days: 52 },
        ChurnRisk { id: "CU0459", name: "Priya Nair", risk_level: "medium", sentiment: 0.55, last_visit_days: 45 },
    ]
}

#[derive(Debug, Clone, Serialize)]
pub struct Transaction {
    pub id: &'static str,
    pub description: &'static str,
    /// Positive for income, negative for spend.
    pub amount: f64,
    pub date: &'static str,
    pub category: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct FinanceDashboard {
    pub revenue_mtd: f64,
    pub expenses_mtd: f64,
    pub net_profit: f64,
    pub profit_margin_percent: f64,
    pub transactions: Vec<Transaction>,
}

pub fn finance_dashboard() -> FinanceDashboard {
    let revenue_mtd = 4_850_000.0;
    let expenses_mtd = 3_120_000.0;
    let net_profit = revenue_mtd - expenses_mtd;
    FinanceDashboard {
        revenue_mtd,
        expenses_mtd,
        net_profit,
        profit_margin_percent: (net_profit / revenue_mtd * 1000.0).round() / 10.0,
        transactions: vec![
            Transaction { id: "TX9001", description: "URGAA charging settlements", amount: 412_500.0, date: "2025-01-14", category: "revenue" },
            Transaction { id: "TX9002", description: "Workshop parts procurement", amount: -186_300.0, date: "2025-01-13", category: "inventory" },
            Transaction { id: "TX9003", description: "GSTSAAS subscriptions", amount: 98_000.0, date: "2025-01-12", category: "revenue" },
            Transaction { id: "TX9004", description: "Grid electricity bill", amount: -254_800.0, date: "2025-01-10", category: "utilities" },
        ],
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Contract {
    pub id: &'static str,
    pub title: &'static str,
    /// `approved`, `pending` or `under_review`.
    pub status: &'static str,
    pub risk_level: &'static str,
    pub valid_until: &'static str,
    pub clauses: u32,
    pub flagged: u32,
}

pub fn contracts() -> Vec<Contract> {
    vec![
        Contract { id: "LC001", title: "Charging Site Lease: Cyber City", status: "approved", risk_level: "low", valid_until: "2027-03-31", clauses: 24, flagged: 0 },
        Contract { id: "LC002", title: "Parts Supply Agreement: Bosch India", status: "under_review", risk_level: "medium", valid_until: "2026-06-30", clauses: 31, flagged: 3 },
        Contract { id: "LC003", title: "Franchise Agreement: Jaipur Workshop", status: "pending", risk_level: "high", valid_until: "2028-01-15", clauses: 42, flagged: 7 },
    ]
}

#[derive(Debug, Clone, Serialize)]
pub struct Department {
    pub name: &'static str,
    pub code: &'static str,
    pub agent: &'static str,
}

pub fn departments() -> Vec<Department> {
    vec![
        Department { name: "IT & Technology", code: "DEPT_TECHNOLOGY", agent: "AG_VISHWAKARMA" },
        Department { name: "Marketing & Growth", code: "DEPT_MARKETING", agent: "AG_BRAHMA" },
        Department { name: "Finance & Accounts", code: "DEPT_FINANCE", agent: "AG_LAKSHMI" },
        Department { name: "Sales & Partnerships", code: "DEPT_SALES", agent: "AG_VARUNA" },
        Department { name: "Customer Support", code: "DEPT_SUPPORT", agent: "AG_KUBERA" },
        Department { name: "Legal & Compliance", code: "DEPT_LEGAL", agent: "AG_YAMA" },
        Department { name: "Operations", code: "DEPT_OPERATIONS_PRODUCTION", agent: "AG_SURYA" },
    ]
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub code: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub agent: &'static str,
    pub agent_name: &'static str,
}

pub fn products() -> Vec<Product> {
    vec![
        Product { code: "PROD_URGAA", name: "URGAA", description: "EV Charging Intelligence", agent: "AG_SURYA", agent_name: "SURYA" },
        Product { code: "PROD_GSTSAAS", name: "GSTSAAS", description: "Workshop Intelligence", agent: "AG_VARUNA", agent_name: "VARUNA" },
        Product { code: "PROD_IGNITION", name: "IGNITION", description: "Customer Intelligence", agent: "AG_BRAHMA", agent_name: "BRAHMA" },
        Product { code: "PROD_ARJUN", name: "ARJUN", description: "Training Intelligence", agent: "AG_SARASWATI", agent_name: "SARASWATI" },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::resolve_agent;

    #[test]
    fn urgaa_metrics_follow_stations() {
        let all = stations();
        let m = urgaa_metrics(&all);
        assert_eq!(m.total_stations, 5);
        assert_eq!(m.active_stations, 3);
        assert_eq!(m.active_sessions, 33);
        assert_eq!(m.alerts_count, 2);
        assert_eq!(m.uptime_percent, 66.0);
        assert_eq!(m.total_energy_mw, 9.03);

        let none = urgaa_metrics(&[]);
        assert_eq!(none.uptime_percent, 0.0);
    }

    #[test]
    fn product_agents_match_the_router() {
        for p in products() {
            let agent = resolve_agent(p.name);
            assert_eq!(agent.code, p.agent);
            assert_eq!(agent.name, p.agent_name);
        }
    }

    #[test]
    fn net_profit_is_derived() {
        let f = finance_dashboard();
        assert_eq!(f.net_profit, f.revenue_mtd - f.expenses_mtd);
        assert_eq!(f.profit_margin_percent, 35.7);
    }

    #[test]
    fn station_lookup_is_case_insensitive() {
        assert_eq!(find_station("st003").map(|s| s.status), Some("alert"));
        assert!(find_station("ST999").is_none());
    }
}
