//! Quotation Types - input, priced result, and the quotation record
//!
//! A quotation is priced either from the lotação tariff table
//! (`use_table = true`) or from a freight value informed by the operator.
//! Operational costs and taxes are then subtracted to judge viability.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, VectraError};

/// Vehicle type assumed for tariff lookups when the input leaves it empty
pub const DEFAULT_VEHICLE_TYPE: &str = "truck";

/// Freight modality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CargoType {
    /// Full truckload, priced by distance-banded tariffs
    #[default]
    Lotacao,
    /// Less-than-truckload
    Fracionada,
    /// Containerised cargo
    Container,
}

/// Axle count used for toll estimation.
///
/// `None` and unknown vehicle types count as a two-axle vehicle.
pub fn axle_count(vehicle_type: Option<&str>) -> u32 {
    match vehicle_type.map(|v| v.trim().to_ascii_lowercase()) {
        Some(v) if v == "truck" => 3,
        Some(v) if v == "carreta" => 5,
        _ => 2,
    }
}

/// Request for a freight quotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotationInput {
    /// Free-form quotation name
    #[serde(default)]
    pub name: Option<String>,

    /// Freight modality
    #[serde(default)]
    pub cargo_type: CargoType,

    /// Origin federative unit (e.g. "SP")
    pub origin_uf: String,

    /// Destination federative unit
    pub destination_uf: String,

    /// Route distance in kilometres
    pub distance_km: f64,

    /// Vehicle type ("truck", "carreta", ...)
    #[serde(default)]
    pub vehicle_type: Option<String>,

    /// Cargo weight in kilograms
    pub weight_kg: f64,

    /// Invoice (nota fiscal) value of the cargo
    pub invoice_value: f64,

    /// Price from the tariff table instead of `informed_freight`
    #[serde(default)]
    pub use_table: bool,

    /// Freight value informed by the operator (manual mode)
    #[serde(default)]
    pub informed_freight: Option<f64>,

    #[serde(default)]
    pub loading_cost: Option<f64>,

    #[serde(default)]
    pub unloading_cost: Option<f64>,

    #[serde(default)]
    pub equipment_rent: Option<f64>,

    /// Toll informed by the operator; estimated when absent
    #[serde(default)]
    pub toll: Option<f64>,

    /// Carried for the caller; the current formula does not read it
    #[serde(default)]
    pub apply_tax_on_costs: bool,

    /// Carried for the caller; the current formula does not read it
    #[serde(default)]
    pub apply_markup: bool,
}

impl QuotationInput {
    /// Create a table-mode quotation input
    pub fn new(
        origin_uf: impl Into<String>,
        destination_uf: impl Into<String>,
        distance_km: f64,
        weight_kg: f64,
        invoice_value: f64,
    ) -> Self {
        Self {
            name: None,
            cargo_type: CargoType::default(),
            origin_uf: origin_uf.into(),
            destination_uf: destination_uf.into(),
            distance_km,
            vehicle_type: None,
            weight_kg,
            invoice_value,
            use_table: true,
            informed_freight: None,
            loading_cost: None,
            unloading_cost: None,
            equipment_rent: None,
            toll: None,
            apply_tax_on_costs: false,
            apply_markup: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_cargo_type(mut self, cargo_type: CargoType) -> Self {
        self.cargo_type = cargo_type;
        self
    }

    pub fn with_vehicle_type(mut self, vehicle_type: impl Into<String>) -> Self {
        self.vehicle_type = Some(vehicle_type.into());
        self
    }

    /// Switch to manual mode with the given freight value
    pub fn with_informed_freight(mut self, freight: f64) -> Self {
        self.use_table = false;
        self.informed_freight = Some(freight);
        self
    }

    /// Set loading, unloading and equipment rent costs
    pub fn with_operational_costs(mut self, loading: f64, unloading: f64, equipment_rent: f64) -> Self {
        self.loading_cost = Some(loading);
        self.unloading_cost = Some(unloading);
        self.equipment_rent = Some(equipment_rent);
        self
    }

    pub fn with_toll(mut self, toll: f64) -> Self {
        self.toll = Some(toll);
        self
    }

    /// Vehicle type used for tariff lookups
    pub fn tariff_vehicle_type(&self) -> &str {
        self.vehicle_type.as_deref().unwrap_or(DEFAULT_VEHICLE_TYPE)
    }

    /// Axle count used for toll estimation
    pub fn axle_count(&self) -> u32 {
        axle_count(self.vehicle_type.as_deref())
    }

    /// Validate the input
    pub fn validate(&self) -> Result<()> {
        if self.origin_uf.trim().is_empty() {
            return Err(VectraError::Validation("origin_uf is required".into()));
        }
        if self.destination_uf.trim().is_empty() {
            return Err(VectraError::Validation("destination_uf is required".into()));
        }
        positive("distance_km", self.distance_km)?;
        positive("weight_kg", self.weight_kg)?;
        positive("invoice_value", self.invoice_value)?;

        let optional = [
            ("informed_freight", self.informed_freight),
            ("loading_cost", self.loading_cost),
            ("unloading_cost", self.unloading_cost),
            ("equipment_rent", self.equipment_rent),
            ("toll", self.toll),
        ];
        for (field, value) in optional {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(VectraError::Validation(format!(
                        "{field} cannot be negative"
                    )));
                }
            }
        }
        Ok(())
    }
}

fn positive(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(VectraError::Validation(format!("{field} must be positive")))
    }
}

/// Where the toll figure in a result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TollSource {
    /// Informed by the caller
    Informed,
    /// Returned by the toll estimator
    Estimated,
    /// Estimator unavailable, toll counted as zero
    Fallback,
}

/// Priced quotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotationResult {
    /// Freight revenue (table-derived or informed)
    pub revenue: f64,

    /// Revenue before adjustments; equals revenue in the current formula
    pub calculated_revenue: f64,

    /// Revenue after adjustments; equals revenue in the current formula
    pub adjusted_revenue: f64,

    /// Freight charged to the customer; equals revenue in the current formula
    pub final_freight: f64,

    /// Base for tax computation; equals revenue in the current formula
    pub tax_base: f64,

    /// Loading + unloading + equipment rent + toll
    pub total_operational_costs: f64,

    /// Toll included in operational costs
    pub toll_value: f64,

    pub toll_source: TollSource,

    /// ICMS rate in percent (e.g. 12.0)
    pub icms_rate: f64,

    pub icms_value: f64,

    /// Itemized PIS
    pub pis_value: f64,

    /// Itemized COFINS
    pub cofins_value: f64,

    /// Combined PIS/COFINS figure used in the cost total
    pub pis_cofins_value: f64,

    /// ICMS + combined PIS/COFINS
    pub total_taxes: f64,

    /// Operational costs + total taxes
    pub total_costs: f64,

    pub gross_margin_value: f64,

    /// Gross margin as a percentage of revenue (0 when revenue is 0)
    pub gross_margin_percent: f64,

    /// Gross margin meets the viability threshold
    pub is_viable: bool,

    /// Gross margin after administrative overhead
    pub net_margin: f64,
}

/// Status of a quotation record; persistence states belong to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotationStatus {
    Calculated,
}

/// A priced quotation, ready to be persisted by the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quotation {
    /// Time-ordered quotation ID
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub status: QuotationStatus,
    pub input: QuotationInput,
    pub result: QuotationResult,
}

impl Quotation {
    /// Wrap a freshly calculated result
    pub fn calculated(input: QuotationInput, result: QuotationResult) -> Self {
        Self {
            id: Uuid::now_v7(),
            created_at: Utc::now(),
            status: QuotationStatus::Calculated,
            input,
            result,
        }
    }
}
