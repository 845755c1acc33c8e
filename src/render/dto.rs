// ==========================================
// 集装箱排载工具 - 展示树结构与渲染器
// ==========================================
// 职责: LoadingPlan → 展示树的纯映射,派生字段仅存在于展示层
// 红线: 渲染绝不修改结果模型;聚合=明细之和 由测试断言,不做防御性重算
// ==========================================

use crate::domain::loading::{
    Container, LoadingPlan, PalletEntry, CONTAINER_CAPACITY_PALLETS, CONTAINER_CAPACITY_WEIGHT_KG,
};
use crate::domain::types::DisplayLocale;
use crate::render::formatter::NumberFormatter;
use serde::Serialize;

// ==========================================
// 展示树节点
// ==========================================

/// 整份方案的展示树根节点
#[derive(Debug, Clone, Serialize)]
pub struct PlanView {
    pub sheet_name: String,        // 本次排载的 sheet
    pub container_count: usize,    // 所需集装箱数(摘要行)
    pub total_quantity: String,    // 全部箱的板位总和(区域格式)
    pub total_weight: String,      // 全部箱的重量总和(区域格式)
    pub is_empty: bool,            // 空结果标记(渲染"无结果"视图)
    pub containers: Vec<ContainerView>,
}

/// 单柜展示节点
#[derive(Debug, Clone, Serialize)]
pub struct ContainerView {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_company: Option<String>,
    pub total_quantity: String,   // 合计板位(区域格式)
    pub quantity_capacity: String, // 板位上限("20,00")
    pub total_weight: String,     // 合计重量(区域格式)
    pub weight_capacity: String,  // 载重上限("24.000,00")
    /// 板位利用率 = total_quantity / 20 (仅展示派生,不落库)
    pub quantity_utilization: f64,
    /// 载重利用率 = total_weight / 24000 (仅展示派生,不落库)
    pub weight_utilization: f64,
    pub quantity_utilization_display: String,
    pub weight_utilization_display: String,
    pub pallets: Vec<PalletView>,
}

/// 板位条目展示节点
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum PalletView {
    #[serde(rename = "SinglePallet")]
    Single(SinglePalletView),
    #[serde(rename = "CombinedPallet")]
    Combined(CombinedPalletView),
}

#[derive(Debug, Clone, Serialize)]
pub struct SinglePalletView {
    pub product_code: String,
    pub product_name: String,
    pub company: String,
    pub quantity: String,     // 区域格式
    pub total_weight: String, // 区域格式
    pub is_split: bool,
    pub is_cross_ship: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CombinedPalletView {
    pub quantity: String,     // 聚合板位(区域格式)
    pub total_weight: String, // 聚合重量(区域格式)
    pub is_cross_ship: bool,
    pub items: Vec<CombinedItemView>, // 明细与聚合并列展示
}

#[derive(Debug, Clone, Serialize)]
pub struct CombinedItemView {
    pub product_code: String,
    pub product_name: String,
    pub company: String,
    pub quantity: String,
    pub total_weight: String,
}

// ==========================================
// PlanRenderer - 结果渲染器
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct PlanRenderer {
    formatter: NumberFormatter,
}

impl PlanRenderer {
    pub fn new(locale: DisplayLocale) -> Self {
        Self {
            formatter: NumberFormatter::new(locale),
        }
    }

    pub fn formatter(&self) -> &NumberFormatter {
        &self.formatter
    }

    /// 渲染整份方案
    pub fn render(&self, plan: &LoadingPlan) -> PlanView {
        PlanView {
            sheet_name: plan.sheet_name().to_string(),
            container_count: plan.container_count(),
            total_quantity: self.formatter.format(plan.total_quantity()),
            total_weight: self.formatter.format(plan.total_weight()),
            is_empty: plan.is_empty(),
            containers: plan
                .containers()
                .iter()
                .map(|c| self.render_container(c))
                .collect(),
        }
    }

    fn render_container(&self, container: &Container) -> ContainerView {
        let quantity_utilization = container.total_quantity / CONTAINER_CAPACITY_PALLETS;
        let weight_utilization = container.total_weight / CONTAINER_CAPACITY_WEIGHT_KG;

        ContainerView {
            id: container.id.clone(),
            main_company: container.main_company.clone(),
            total_quantity: self.formatter.format(container.total_quantity),
            quantity_capacity: self.formatter.format(CONTAINER_CAPACITY_PALLETS),
            total_weight: self.formatter.format(container.total_weight),
            weight_capacity: self.formatter.format(CONTAINER_CAPACITY_WEIGHT_KG),
            quantity_utilization,
            weight_utilization,
            quantity_utilization_display: self.formatter.format_percent(quantity_utilization),
            weight_utilization_display: self.formatter.format_percent(weight_utilization),
            pallets: container
                .contents
                .iter()
                .map(|entry| self.render_entry(entry))
                .collect(),
        }
    }

    fn render_entry(&self, entry: &PalletEntry) -> PalletView {
        match entry {
            PalletEntry::SinglePallet(pallet) => PalletView::Single(SinglePalletView {
                product_code: pallet.product_code.clone(),
                product_name: pallet.product_name.clone(),
                company: pallet.company.clone(),
                quantity: self.formatter.format(pallet.quantity),
                total_weight: self.formatter.format(pallet.total_weight),
                is_split: pallet.is_split,
                is_cross_ship: pallet.is_cross_ship,
            }),
            PalletEntry::CombinedPallet(pallet) => PalletView::Combined(CombinedPalletView {
                quantity: self.formatter.format(pallet.quantity),
                total_weight: self.formatter.format(pallet.total_weight),
                is_cross_ship: pallet.is_cross_ship,
                items: pallet
                    .items
                    .iter()
                    .map(|item| CombinedItemView {
                        product_code: item.product_code.clone(),
                        product_name: item.product_name.clone(),
                        company: item.company.clone(),
                        quantity: self.formatter.format(item.quantity),
                        total_weight: self.formatter.format(item.total_weight),
                    })
                    .collect(),
            }),
        }
    }
}
