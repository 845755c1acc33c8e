// ==========================================
// 集装箱排载工具 - 排载结果领域模型
// ==========================================
// 职责: 优化服务返回结果的规范形态与模型边界校验
// 红线: LoadingPlan 构造后不可变;回退到 Configure 时整体丢弃
// 红线: 采用 type 标签联合的富形态;旧版扁平结构一律拒绝
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 单柜容量上限(板位当量)
pub const CONTAINER_CAPACITY_PALLETS: f64 = 20.0;

/// 单柜载重上限(kg)
pub const CONTAINER_CAPACITY_WEIGHT_KG: f64 = 24000.0;

/// 浮点数量比较容差
pub const QUANTITY_EPSILON: f64 = 1e-6;

// ==========================================
// CombinedItem - 拼板明细项
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinedItem {
    pub product_code: String,  // 产品编码
    pub product_name: String,  // 产品名称
    pub company: String,       // 所属公司
    pub quantity: f64,         // 板位数量(可为小数)
    pub total_weight: f64,     // 合计重量(kg)
}

// ==========================================
// SinglePallet - 单板
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinglePallet {
    pub product_code: String, // 产品编码
    pub product_name: String, // 产品名称
    pub company: String,      // 所属公司
    pub quantity: f64,        // 板位数量
    pub total_weight: f64,    // 合计重量(kg)
    #[serde(default)]
    pub is_split: bool,       // 是否为原始行项目跨柜拆分出的片段
    #[serde(default)]
    pub is_cross_ship: bool,  // 是否与本柜主公司不一致(拼柜)
}

// ==========================================
// CombinedPallet - 拼板
// ==========================================
// 多个零散板量共享一个物理板位,可跨产品/跨公司
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinedPallet {
    pub quantity: f64,            // 聚合板位数量 = Σ 明细数量
    pub total_weight: f64,        // 聚合重量 = Σ 明细重量
    #[serde(default)]
    pub is_cross_ship: bool,      // 是否拼柜(明细跨公司或整板跨柜)
    pub items: Vec<CombinedItem>, // 拼板明细(保序)
}

impl CombinedPallet {
    /// 明细中互异公司数
    pub fn distinct_company_count(&self) -> usize {
        let mut companies: Vec<&str> = self.items.iter().map(|i| i.company.as_str()).collect();
        companies.sort_unstable();
        companies.dedup();
        companies.len()
    }
}

// ==========================================
// PalletEntry - 板位条目(标签联合)
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PalletEntry {
    SinglePallet(SinglePallet),
    CombinedPallet(CombinedPallet),
}

impl PalletEntry {
    pub fn quantity(&self) -> f64 {
        match self {
            PalletEntry::SinglePallet(p) => p.quantity,
            PalletEntry::CombinedPallet(p) => p.quantity,
        }
    }

    pub fn total_weight(&self) -> f64 {
        match self {
            PalletEntry::SinglePallet(p) => p.total_weight,
            PalletEntry::CombinedPallet(p) => p.total_weight,
        }
    }

    pub fn is_cross_ship(&self) -> bool {
        match self {
            PalletEntry::SinglePallet(p) => p.is_cross_ship,
            PalletEntry::CombinedPallet(p) => p.is_cross_ship,
        }
    }

    /// 拆分标志仅对单板有意义
    pub fn is_split(&self) -> bool {
        match self {
            PalletEntry::SinglePallet(p) => p.is_split,
            PalletEntry::CombinedPallet(_) => false,
        }
    }
}

// ==========================================
// Container - 集装箱
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Container {
    pub id: String,               // 箱号(如 "C1")
    pub total_quantity: f64,      // 合计板位 = Σ 条目数量
    pub total_weight: f64,        // 合计重量 = Σ 条目重量
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_company: Option<String>, // 本柜主公司(判定拼柜的基准)
    pub contents: Vec<PalletEntry>,   // 板位条目(保序)
}

// ==========================================
// PlanInvariantError - 模型边界校验错误
// ==========================================
// 任何一条不变量被破坏都拒绝整份结果,绝不渲染部分数据
#[derive(Error, Debug)]
pub enum PlanInvariantError {
    #[error("结果结构不符合规范: {0}")]
    MalformedResponse(String),

    #[error("集装箱 {container_id} 无任何板位条目")]
    EmptyContainer { container_id: String },

    #[error("集装箱 {container_id} 板位合计不一致: 声明 {declared:.6}, 实际 {computed:.6}")]
    QuantitySumMismatch {
        container_id: String,
        declared: f64,
        computed: f64,
    },

    #[error("集装箱 {container_id} 重量合计不一致: 声明 {declared:.6}, 实际 {computed:.6}")]
    WeightSumMismatch {
        container_id: String,
        declared: f64,
        computed: f64,
    },

    #[error("集装箱 {container_id} 拼板聚合数量不一致: 聚合 {aggregate:.6}, 明细和 {item_sum:.6}")]
    CombinedQuantityMismatch {
        container_id: String,
        aggregate: f64,
        item_sum: f64,
    },

    #[error("集装箱 {container_id} 拼板聚合重量不一致: 聚合 {aggregate:.6}, 明细和 {item_sum:.6}")]
    CombinedWeightMismatch {
        container_id: String,
        aggregate: f64,
        item_sum: f64,
    },

    #[error("集装箱 {container_id} 板位超限: {total_quantity:.2} > {limit:.2}")]
    QuantityCapacityExceeded {
        container_id: String,
        total_quantity: f64,
        limit: f64,
    },

    #[error("集装箱 {container_id} 载重超限: {total_weight:.2} > {limit:.2}kg")]
    WeightCapacityExceeded {
        container_id: String,
        total_weight: f64,
        limit: f64,
    },

    #[error("集装箱 {container_id} 拼柜标志不一致: {detail}")]
    CrossShipFlagInconsistent { container_id: String, detail: String },
}

// ==========================================
// LoadingPlan - 排载方案(结果模型)
// ==========================================
// 字段私有: 构造即校验,构造后只读
#[derive(Debug, Clone, Serialize)]
pub struct LoadingPlan {
    containers: Vec<Container>,
    source_file_path: String,
    sheet_name: String,
    received_at: DateTime<Utc>,
}

impl LoadingPlan {
    /// 在模型边界校验并构造排载方案
    ///
    /// # 参数
    /// - containers: 服务端返回的集装箱列表
    /// - source_file_path: 原始上传文件路径(导出时回传)
    /// - sheet_name: 本次排载的 sheet
    ///
    /// # 返回
    /// - Ok(LoadingPlan): 全部不变量成立
    /// - Err(PlanInvariantError): 任一不变量被破坏,整份结果拒收
    pub fn from_results(
        containers: Vec<Container>,
        source_file_path: impl Into<String>,
        sheet_name: impl Into<String>,
    ) -> Result<Self, PlanInvariantError> {
        for container in &containers {
            validate_container(container)?;
        }

        Ok(Self {
            containers,
            source_file_path: source_file_path.into(),
            sheet_name: sheet_name.into(),
            received_at: Utc::now(),
        })
    }

    pub fn containers(&self) -> &[Container] {
        &self.containers
    }

    pub fn source_file_path(&self) -> &str {
        &self.source_file_path
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    pub fn container_count(&self) -> usize {
        self.containers.len()
    }

    /// 全部集装箱的板位总和
    pub fn total_quantity(&self) -> f64 {
        self.containers.iter().map(|c| c.total_quantity).sum()
    }

    /// 全部集装箱的重量总和(kg)
    pub fn total_weight(&self) -> f64 {
        self.containers.iter().map(|c| c.total_weight).sum()
    }
}

// ==========================================
// 不变量校验
// ==========================================

fn validate_container(container: &Container) -> Result<(), PlanInvariantError> {
    let id = container.id.clone();

    if container.contents.is_empty() {
        return Err(PlanInvariantError::EmptyContainer { container_id: id });
    }

    // 合计一致性
    let quantity_sum: f64 = container.contents.iter().map(|p| p.quantity()).sum();
    if (quantity_sum - container.total_quantity).abs() > QUANTITY_EPSILON {
        return Err(PlanInvariantError::QuantitySumMismatch {
            container_id: id,
            declared: container.total_quantity,
            computed: quantity_sum,
        });
    }

    let weight_sum: f64 = container.contents.iter().map(|p| p.total_weight()).sum();
    if (weight_sum - container.total_weight).abs() > QUANTITY_EPSILON {
        return Err(PlanInvariantError::WeightSumMismatch {
            container_id: id,
            declared: container.total_weight,
            computed: weight_sum,
        });
    }

    // 容量上限
    if container.total_quantity > CONTAINER_CAPACITY_PALLETS + QUANTITY_EPSILON {
        return Err(PlanInvariantError::QuantityCapacityExceeded {
            container_id: id,
            total_quantity: container.total_quantity,
            limit: CONTAINER_CAPACITY_PALLETS,
        });
    }
    if container.total_weight > CONTAINER_CAPACITY_WEIGHT_KG + QUANTITY_EPSILON {
        return Err(PlanInvariantError::WeightCapacityExceeded {
            container_id: id,
            total_weight: container.total_weight,
            limit: CONTAINER_CAPACITY_WEIGHT_KG,
        });
    }

    for entry in &container.contents {
        validate_entry(&container.id, container.main_company.as_deref(), entry)?;
    }

    Ok(())
}

fn validate_entry(
    container_id: &str,
    main_company: Option<&str>,
    entry: &PalletEntry,
) -> Result<(), PlanInvariantError> {
    match entry {
        PalletEntry::SinglePallet(pallet) => {
            // 主公司已知时,单板拼柜标志应与公司归属完全对应
            if let Some(main) = main_company {
                let expected = pallet.company != main;
                if pallet.is_cross_ship != expected {
                    return Err(PlanInvariantError::CrossShipFlagInconsistent {
                        container_id: container_id.to_string(),
                        detail: format!(
                            "单板 {} 公司 {} / 主公司 {} / is_cross_ship={}",
                            pallet.product_code, pallet.company, main, pallet.is_cross_ship
                        ),
                    });
                }
            }
        }
        PalletEntry::CombinedPallet(pallet) => {
            if pallet.items.is_empty() {
                return Err(PlanInvariantError::MalformedResponse(format!(
                    "集装箱 {} 内的拼板无明细项",
                    container_id
                )));
            }

            let item_quantity: f64 = pallet.items.iter().map(|i| i.quantity).sum();
            if (item_quantity - pallet.quantity).abs() > QUANTITY_EPSILON {
                return Err(PlanInvariantError::CombinedQuantityMismatch {
                    container_id: container_id.to_string(),
                    aggregate: pallet.quantity,
                    item_sum: item_quantity,
                });
            }

            let item_weight: f64 = pallet.items.iter().map(|i| i.total_weight).sum();
            if (item_weight - pallet.total_weight).abs() > QUANTITY_EPSILON {
                return Err(PlanInvariantError::CombinedWeightMismatch {
                    container_id: container_id.to_string(),
                    aggregate: pallet.total_weight,
                    item_sum: item_weight,
                });
            }

            let distinct = pallet.distinct_company_count();
            if distinct > 1 && !pallet.is_cross_ship {
                return Err(PlanInvariantError::CrossShipFlagInconsistent {
                    container_id: container_id.to_string(),
                    detail: format!("拼板明细跨 {} 家公司但未标记 is_cross_ship", distinct),
                });
            }
            if distinct == 1 {
                if let (Some(main), Some(item)) = (main_company, pallet.items.first()) {
                    let expected = item.company != main;
                    if pallet.is_cross_ship != expected {
                        return Err(PlanInvariantError::CrossShipFlagInconsistent {
                            container_id: container_id.to_string(),
                            detail: format!(
                                "拼板公司 {} / 主公司 {} / is_cross_ship={}",
                                item.company, main, pallet.is_cross_ship
                            ),
                        });
                    }
                }
            }
        }
    }
    Ok(())
}
