use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveDateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Row};
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{EntityKind, InspectionReport};
use crate::source::{DailyCountSource, ReportSource};

const REPORT_COLUMNS: &str = "wr.id AS report_id, wr.ticket_id, t.screen_id, s.name AS screen_name, \
     wr.report_date, wr.data_cables, wr.power_cable, wr.power_supplies, wr.led_modules, \
     wr.cooling_systems, wr.service_lights_sockets, wr.operating_computers, wr.software, \
     wr.power_dbs, wr.media_converters, wr.control_systems, wr.video_processors";

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_report(row: &PgRow) -> Result<InspectionReport, sqlx::Error> {
    Ok(InspectionReport {
        report_id: row.try_get("report_id")?,
        ticket_id: row.try_get("ticket_id")?,
        screen_id: row.try_get("screen_id")?,
        screen_name: row.try_get("screen_name")?,
        report_date: row.try_get("report_date")?,
        data_cables: row.try_get("data_cables")?,
        power_cable: row.try_get("power_cable")?,
        power_supplies: row.try_get("power_supplies")?,
        led_modules: row.try_get("led_modules")?,
        cooling_systems: row.try_get("cooling_systems")?,
        service_lights_sockets: row.try_get("service_lights_sockets")?,
        operating_computers: row.try_get("operating_computers")?,
        software: row.try_get("software")?,
        power_dbs: row.try_get("power_dbs")?,
        media_converters: row.try_get("media_converters")?,
        control_systems: row.try_get("control_systems")?,
        video_processors: row.try_get("video_processors")?,
    })
}

#[async_trait]
impl ReportSource for PgStore {
    async fn fetch_reports(
        &self,
        screen_ids: &[Uuid],
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> anyhow::Result<Vec<InspectionReport>> {
        // LEFT JOIN keeps orphaned tickets visible so they can be counted.
        let mut query = format!(
            "SELECT {} \
             FROM screen_ops.worker_reports wr \
             JOIN screen_ops.tickets t ON t.id = wr.ticket_id \
             LEFT JOIN screen_ops.screens s ON s.id = t.screen_id \
             WHERE wr.report_date >= $1 AND wr.report_date <= $2",
            REPORT_COLUMNS
        );

        if !screen_ids.is_empty() {
            query.push_str(" AND t.screen_id = ANY($3)");
        }

        let mut rows = sqlx::query(&query).bind(start).bind(end);
        if !screen_ids.is_empty() {
            rows = rows.bind(screen_ids.to_vec());
        }

        let records = rows
            .fetch_all(&self.pool)
            .await
            .context("failed to query worker reports")?;

        let reports = records
            .iter()
            .map(row_to_report)
            .collect::<Result<Vec<_>, _>>()
            .context("failed to decode worker report row")?;

        debug!(count = reports.len(), %start, %end, "fetched worker reports");
        Ok(reports)
    }
}

#[async_trait]
impl DailyCountSource for PgStore {
    async fn fetch_daily_counts(
        &self,
        kind: EntityKind,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> anyhow::Result<BTreeMap<NaiveDate, i64>> {
        let query = format!(
            "SELECT created_at::date AS day, COUNT(*) AS total \
             FROM screen_ops.{} \
             WHERE created_at >= $1 AND created_at < $2 \
             GROUP BY day",
            kind.table()
        );

        let rows = sqlx::query(&query)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("failed to count {} by day", kind.table()))?;

        let mut counts = BTreeMap::new();
        for row in rows {
            let day: NaiveDate = row.try_get("day")?;
            let total: i64 = row.try_get("total")?;
            counts.insert(day, total);
        }

        Ok(counts)
    }
}

const UPSERT_SCREEN: &str = r#"
    INSERT INTO screen_ops.screens AS s (id, name, contract_id)
    VALUES ($1, $2, $3)
    ON CONFLICT (name) DO UPDATE
    SET contract_id = COALESCE(s.contract_id, EXCLUDED.contract_id)
    RETURNING id
"#;

async fn upsert_screen(
    conn: &mut PgConnection,
    id: Uuid,
    name: &str,
    contract_id: Option<Uuid>,
) -> anyhow::Result<Uuid> {
    let screen_id = sqlx::query(UPSERT_SCREEN)
        .bind(id)
        .bind(name)
        .bind(contract_id)
        .fetch_one(conn)
        .await
        .with_context(|| format!("failed to upsert screen {name}"))?
        .try_get("id")?;
    Ok(screen_id)
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let mut tx = pool.begin().await?;
    let now = Utc::now().naive_utc();
    let days_ago = |days: i64, hour: i64| now - Duration::days(days) - Duration::hours(hour);

    let company_id = Uuid::parse_str("6b1f0a52-0d7e-4c4b-9d1e-0a6e0a3c5f11")?;
    sqlx::query(
        r#"
        INSERT INTO screen_ops.companies (id, name, created_at)
        VALUES ($1, $2, $3)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(company_id)
    .bind("Brightline Outdoor Media")
    .bind(days_ago(6, 0))
    .execute(&mut *tx)
    .await?;

    let users = vec![
        (
            Uuid::parse_str("a3e5c1d2-7f64-4a1b-8e2c-1f9d0b7c6a01")?,
            "Mara Okafor",
            "mara.okafor@brightline.example",
            "ADMIN",
            days_ago(6, 1),
        ),
        (
            Uuid::parse_str("b4f6d2e3-8075-4b2c-9f3d-2a0e1c8d7b02")?,
            "Tomas Vidal",
            "tomas.vidal@brightline.example",
            "WORKER",
            days_ago(3, 4),
        ),
    ];

    for (id, name, email, role, created_at) in users {
        sqlx::query(
            r#"
            INSERT INTO screen_ops.users (id, company_id, full_name, email, role, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (email) DO UPDATE
            SET full_name = EXCLUDED.full_name, role = EXCLUDED.role
            "#,
        )
        .bind(id)
        .bind(company_id)
        .bind(name)
        .bind(email)
        .bind(role)
        .bind(created_at)
        .execute(&mut *tx)
        .await?;
    }

    let contract_id = Uuid::parse_str("c5a7e3f4-9186-4c3d-8a4e-3b1f2d9e8c03")?;
    sqlx::query(
        r#"
        INSERT INTO screen_ops.contracts (id, company_id, title, created_at)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(contract_id)
    .bind(company_id)
    .bind("Harbour Front LED maintenance 2026")
    .bind(days_ago(5, 2))
    .execute(&mut *tx)
    .await?;

    let screens = vec![
        (
            Uuid::parse_str("d6b8f405-a297-4d4e-9b5f-4c2a3e0f9d04")?,
            "Harbour Front North",
        ),
        (
            Uuid::parse_str("e7c90516-b3a8-4e5f-8c60-5d3b4f1a0e05")?,
            "Central Station Concourse",
        ),
    ];

    // Names may already exist from an import under other ids.
    let mut screen_ids = Vec::with_capacity(screens.len());
    for (id, name) in screens {
        screen_ids.push(upsert_screen(&mut *tx, id, name, Some(contract_id)).await?);
    }

    // The last ticket has no screen and exercises the orphan exclusion path.
    let tickets = vec![
        (
            Uuid::parse_str("f8da0627-c4b9-4f60-9d71-6e4c5a2b1f06")?,
            Some(screen_ids[0]),
            "Flicker on lower panel rows",
            days_ago(4, 3),
        ),
        (
            Uuid::parse_str("09eb1738-d5ca-4071-8e82-7f5d6b3c2a07")?,
            Some(screen_ids[1]),
            "Quarterly inspection",
            days_ago(3, 2),
        ),
        (
            Uuid::parse_str("1afc2849-e6db-4182-9f93-806e7c4d3b08")?,
            None,
            "Unassigned call-out",
            days_ago(2, 6),
        ),
    ];

    for (id, screen_id, title, created_at) in &tickets {
        sqlx::query(
            r#"
            INSERT INTO screen_ops.tickets (id, screen_id, title, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(screen_id)
        .bind(title)
        .bind(created_at)
        .execute(&mut *tx)
        .await?;
    }

    let reports = vec![
        (
            "seed-001",
            tickets[0].0,
            days_ago(3, 0),
            Some("OK"),
            Some("Frayed near junction box"),
            Some("Dead pixel cluster"),
        ),
        (
            "seed-002",
            tickets[1].0,
            days_ago(2, 1),
            Some("Loose RJ45"),
            Some("OK"),
            Some("ok"),
        ),
        (
            "seed-003",
            tickets[2].0,
            days_ago(1, 2),
            Some("OK"),
            Some("Burnt connector"),
            None,
        ),
    ];

    for (source_key, ticket_id, report_date, data_cables, power_cable, led_modules) in reports {
        sqlx::query(
            r#"
            INSERT INTO screen_ops.worker_reports
            (id, ticket_id, report_date, data_cables, power_cable, led_modules, source_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(ticket_id)
        .bind(report_date)
        .bind(data_cables)
        .bind(power_cable)
        .bind(led_modules)
        .bind(source_key)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    info!("seed data inserted");
    Ok(())
}

pub async fn import_csv(pool: &PgPool, csv_path: &Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        screen_name: Option<String>,
        ticket_title: String,
        report_date: NaiveDateTime,
        data_cables: Option<String>,
        power_cable: Option<String>,
        power_supplies: Option<String>,
        led_modules: Option<String>,
        cooling_systems: Option<String>,
        service_lights_sockets: Option<String>,
        operating_computers: Option<String>,
        software: Option<String>,
        power_dbs: Option<String>,
        media_converters: Option<String>,
        control_systems: Option<String>,
        video_processors: Option<String>,
        source_key: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut tx = pool.begin().await?;
    let mut inserted = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        let source_key = row
            .source_key
            .unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));

        let exists: bool = sqlx::query(
            "SELECT EXISTS (SELECT 1 FROM screen_ops.worker_reports WHERE source_key = $1) AS found",
        )
        .bind(&source_key)
        .fetch_one(&mut *tx)
        .await?
        .try_get("found")?;
        if exists {
            debug!(%source_key, "skipping already imported report");
            continue;
        }

        let screen_id: Option<Uuid> = match row.screen_name.as_deref() {
            Some(name) => Some(upsert_screen(&mut *tx, Uuid::new_v4(), name, None).await?),
            None => None,
        };

        let ticket_id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO screen_ops.tickets (id, screen_id, title, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(ticket_id)
        .bind(screen_id)
        .bind(&row.ticket_title)
        .bind(row.report_date)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO screen_ops.worker_reports
            (id, ticket_id, report_date, data_cables, power_cable, power_supplies, led_modules,
             cooling_systems, service_lights_sockets, operating_computers, software, power_dbs,
             media_converters, control_systems, video_processors, source_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(ticket_id)
        .bind(row.report_date)
        .bind(&row.data_cables)
        .bind(&row.power_cable)
        .bind(&row.power_supplies)
        .bind(&row.led_modules)
        .bind(&row.cooling_systems)
        .bind(&row.service_lights_sockets)
        .bind(&row.operating_computers)
        .bind(&row.software)
        .bind(&row.power_dbs)
        .bind(&row.media_converters)
        .bind(&row.control_systems)
        .bind(&row.video_processors)
        .bind(&source_key)
        .execute(&mut *tx)
        .await?;

        inserted += 1;
    }

    tx.commit().await?;
    info!(inserted, path = %csv_path.display(), "imported worker reports");
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_upsert_returns_existing_id_on_name_clash() {
        let sql = UPSERT_SCREEN.split_whitespace().collect::<Vec<_>>().join(" ");
        assert!(sql.contains("ON CONFLICT (name) DO UPDATE"));
        assert!(sql.ends_with("RETURNING id"));
        assert!(!sql.contains("DO NOTHING"));
    }

    #[test]
    fn report_columns_cover_every_checklist_field() {
        for column in [
            "data_cables",
            "power_cable",
            "power_supplies",
            "led_modules",
            "cooling_systems",
            "service_lights_sockets",
            "operating_computers",
            "software",
            "power_dbs",
            "media_converters",
            "control_systems",
            "video_processors",
        ] {
            assert!(REPORT_COLUMNS.contains(&format!("wr.{column}")), "{column}");
        }
    }
}
