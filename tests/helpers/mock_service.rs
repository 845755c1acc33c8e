// ==========================================
// Mock 优化服务实现 - 用于集成测试
// ==========================================
// 职责: 以可配置的数据/错误/闸门替代 HTTP 实现,
// 并记录各操作的调用次数(零网络断言依据)
// ==========================================

use async_trait::async_trait;
use chrono::Utc;
use container_loading_planner::domain::loading::{
    CombinedItem, CombinedPallet, Container, PalletEntry, SinglePallet,
};
use container_loading_planner::domain::types::FileKind;
use container_loading_planner::domain::upload::UploadedFile;
use container_loading_planner::optimizer::error::{OptimizerError, OptimizerResult};
use container_loading_planner::optimizer::wire::{ExportRequest, ProcessRequest};
use container_loading_planner::optimizer::{HttpOptimizerService, OptimizerService};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// 导出行为配置
pub enum ExportBehavior {
    /// 成功返回二进制产物
    Payload(Vec<u8>),
    /// 二进制通道上的错误报文(走真实解码逻辑)
    ErrorBody { status: u16, body: Vec<u8> },
}

/// process 闸门: 先通知 entered,再等待 release
///
/// 用于在测试中制造"响应在途时用户回退"的时序
#[derive(Clone)]
pub struct ProcessGate {
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
}

impl ProcessGate {
    pub fn new() -> Self {
        Self {
            entered: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
        }
    }
}

// ==========================================
// MockOptimizerService
// ==========================================
pub struct MockOptimizerService {
    /// 上传返回的 sheet 列表
    pub sheets: Vec<String>,
    /// (sheet, header_row) → 列名;未登记的组合返回服务端错误
    columns: Mutex<HashMap<(String, u32), Vec<String>>>,
    /// process 成功时返回的集装箱(每次克隆)
    results: Mutex<Vec<Container>>,
    /// process 的一次性错误注入
    process_error: Mutex<Option<OptimizerError>>,
    /// 导出行为
    export_behavior: Mutex<ExportBehavior>,
    /// process 闸门(可选)
    process_gate: Mutex<Option<ProcessGate>>,

    // 调用计数
    pub upload_calls: AtomicUsize,
    pub fetch_columns_calls: AtomicUsize,
    pub process_calls: AtomicUsize,
    pub export_calls: AtomicUsize,

    /// 最后一次 process 请求载荷(断言下发字段)
    pub last_process_request: Mutex<Option<ProcessRequest>>,
}

impl MockOptimizerService {
    /// 创建默认 Mock: 两个 sheet,无列结构登记
    pub fn new(sheets: &[&str]) -> Self {
        Self {
            sheets: sheets.iter().map(|s| s.to_string()).collect(),
            columns: Mutex::new(HashMap::new()),
            results: Mutex::new(Vec::new()),
            process_error: Mutex::new(None),
            export_behavior: Mutex::new(ExportBehavior::Payload(b"PK\x03\x04 mock".to_vec())),
            process_gate: Mutex::new(None),
            upload_calls: AtomicUsize::new(0),
            fetch_columns_calls: AtomicUsize::new(0),
            process_calls: AtomicUsize::new(0),
            export_calls: AtomicUsize::new(0),
            last_process_request: Mutex::new(None),
        }
    }

    /// 登记某 (sheet, header_row) 的列名
    pub fn register_columns(&self, sheet: &str, header_row: u32, columns: &[&str]) {
        self.columns.lock().unwrap().insert(
            (sheet.to_string(), header_row),
            columns.iter().map(|c| c.to_string()).collect(),
        );
    }

    /// 设置 process 成功返回的集装箱
    pub fn set_results(&self, results: Vec<Container>) {
        *self.results.lock().unwrap() = results;
    }

    /// 注入一次性 process 错误
    pub fn set_process_error(&self, error: OptimizerError) {
        *self.process_error.lock().unwrap() = Some(error);
    }

    /// 设置导出行为
    pub fn set_export_behavior(&self, behavior: ExportBehavior) {
        *self.export_behavior.lock().unwrap() = behavior;
    }

    /// 安装 process 闸门
    pub fn set_process_gate(&self, gate: ProcessGate) {
        *self.process_gate.lock().unwrap() = Some(gate);
    }
}

#[async_trait]
impl OptimizerService for MockOptimizerService {
    async fn upload_file(&self, file_name: &str, _bytes: Vec<u8>) -> OptimizerResult<UploadedFile> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        Ok(UploadedFile {
            file_path: "uploads/shipment.xlsx".to_string(),
            sheets: self.sheets.clone(),
            file_kind: FileKind::from_file_name(file_name).unwrap_or(FileKind::Xlsx),
            uploaded_at: Utc::now(),
        })
    }

    async fn fetch_columns(
        &self,
        _file_path: &str,
        sheet_name: &str,
        header_row: u32,
    ) -> OptimizerResult<Vec<String>> {
        self.fetch_columns_calls.fetch_add(1, Ordering::SeqCst);
        let columns = self.columns.lock().unwrap();
        match columns.get(&(sheet_name.to_string(), header_row)) {
            Some(cols) => Ok(cols.clone()),
            None => Err(OptimizerError::Server {
                status: 400,
                message: format!("sheet 或表头行无效: {}@{}", sheet_name, header_row),
            }),
        }
    }

    async fn process(&self, request: ProcessRequest) -> OptimizerResult<Vec<Container>> {
        self.process_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_process_request.lock().unwrap() = Some(request);

        let gate = {
            let guard = self.process_gate.lock().unwrap();
            guard.clone()
        };
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }

        if let Some(error) = self.process_error.lock().unwrap().take() {
            return Err(error);
        }
        Ok(self.results.lock().unwrap().clone())
    }

    async fn generate_packing_list(&self, _request: ExportRequest<'_>) -> OptimizerResult<Vec<u8>> {
        self.export_calls.fetch_add(1, Ordering::SeqCst);
        let behavior = self.export_behavior.lock().unwrap();
        match &*behavior {
            ExportBehavior::Payload(bytes) => Ok(bytes.clone()),
            // 失败响应的报文按二进制到达,走真实的 文本 → JSON 解码路径
            ExportBehavior::ErrorBody { status, body } => {
                Err(HttpOptimizerService::decode_error_payload(*status, body))
            }
        }
    }
}

// ==========================================
// 样例数据构造
// ==========================================

pub fn single(code: &str, company: &str, quantity: f64, weight: f64) -> PalletEntry {
    PalletEntry::SinglePallet(SinglePallet {
        product_code: code.to_string(),
        product_name: format!("产品 {}", code),
        company: company.to_string(),
        quantity,
        total_weight: weight,
        is_split: false,
        is_cross_ship: false,
    })
}

pub fn combined_item(code: &str, company: &str, quantity: f64, weight: f64) -> CombinedItem {
    CombinedItem {
        product_code: code.to_string(),
        product_name: format!("产品 {}", code),
        company: company.to_string(),
        quantity,
        total_weight: weight,
    }
}

/// 两柜样例: 合计/容量/拼柜标志全部满足不变量
pub fn sample_containers() -> Vec<Container> {
    vec![
        Container {
            id: "C1".to_string(),
            total_quantity: 19.5,
            total_weight: 23000.0,
            main_company: Some("ACME".to_string()),
            contents: vec![
                single("P01", "ACME", 12.0, 14000.0),
                single("P02", "ACME", 6.0, 7200.0),
                PalletEntry::CombinedPallet(CombinedPallet {
                    quantity: 1.5,
                    total_weight: 1800.0,
                    is_cross_ship: true,
                    items: vec![
                        combined_item("P03", "ACME", 0.5, 600.0),
                        combined_item("P04", "BETA", 1.0, 1200.0),
                    ],
                }),
            ],
        },
        Container {
            id: "C2".to_string(),
            total_quantity: 10.0,
            total_weight: 12000.0,
            main_company: Some("BETA".to_string()),
            contents: vec![single("P05", "BETA", 10.0, 12000.0)],
        },
    ]
}

/// 破坏容量上限的样例(板位 21 > 20)
pub fn oversized_containers() -> Vec<Container> {
    vec![Container {
        id: "C9".to_string(),
        total_quantity: 21.0,
        total_weight: 20000.0,
        main_company: Some("ACME".to_string()),
        contents: vec![single("P99", "ACME", 21.0, 20000.0)],
    }]
}
