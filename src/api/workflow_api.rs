// ==========================================
// 集装箱排载工具 - 工作流API
// ==========================================
// 职责: 会话生命周期编排(Upload → Configure → Results)
// 红线: 每步骤至多一个在途请求;回退清空全部下游状态
// 红线: 请求按发起纪元打标,纪元失配的响应一律丢弃
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::api::export_api::{ExportApi, ExportApiResponse};
use crate::config::ConfigManager;
use crate::domain::configuration::LoadConfiguration;
use crate::domain::loading::LoadingPlan;
use crate::domain::types::{FileKind, FilterMatchMode, OperationKind, WorkflowStep};
use crate::domain::upload::{SheetSchema, UploadedFile};
use crate::optimizer::wire::ProcessRequest;
use crate::optimizer::OptimizerService;
use crate::render::dto::{PlanRenderer, PlanView};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// Applied - 请求结局
// ==========================================
// 在途请求返回时,若会话已因回退进入新纪元,
// 响应被显式丢弃(Stale),不产生任何状态变化
#[derive(Debug)]
pub enum Applied<T> {
    /// 响应已应用,携带本次结果
    Applied(T),
    /// 纪元失配,响应被丢弃
    Stale,
}

impl<T> Applied<T> {
    pub fn is_stale(&self) -> bool {
        matches!(self, Applied::Stale)
    }

    /// 取出已应用的结果
    pub fn into_applied(self) -> Option<T> {
        match self {
            Applied::Applied(value) => Some(value),
            Applied::Stale => None,
        }
    }
}

/// 列结构刷新结果
#[derive(Debug, Clone, Serialize)]
pub struct SchemaRefresh {
    /// 当前可映射列名(保序)
    pub columns: Vec<String>,
    /// 因不在新列表中而被清除的列选择
    pub invalidated: Vec<String>,
}

/// 排载提交结果
#[derive(Debug, Clone, Serialize)]
pub struct SubmitOutcome {
    /// 所需集装箱数
    pub container_count: usize,
}

/// 会话快照(供嵌入方渲染控件可用态)
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub step: WorkflowStep,
    /// 在途请求(嵌入方据此禁用该步骤的触发控件)
    pub busy: Option<OperationKind>,
    pub sheets: Vec<String>,
    pub columns: Vec<String>,
    pub configuration: LoadConfiguration,
    pub can_submit: bool,
    pub has_plan: bool,
}

// ==========================================
// SessionState - 会话状态
// ==========================================
// 全部状态限定单用户会话;无跨会话共享可变状态
struct SessionState {
    step: WorkflowStep,
    /// 请求纪元: 每次回退自增,用于过期响应抑制
    epoch: u64,
    in_flight: Option<OperationKind>,
    uploaded: Option<UploadedFile>,
    schema: Option<SheetSchema>,
    config: LoadConfiguration,
    plan: Option<Arc<LoadingPlan>>,
}

impl SessionState {
    fn new() -> Self {
        Self {
            step: WorkflowStep::Upload,
            epoch: 0,
            in_flight: None,
            uploaded: None,
            schema: None,
            config: LoadConfiguration::default(),
            plan: None,
        }
    }
}

// ==========================================
// WorkflowApi - 工作流控制器
// ==========================================
pub struct WorkflowApi {
    service: Arc<dyn OptimizerService>,
    export_api: Arc<ExportApi>,
    renderer: PlanRenderer,
    filter_match_mode: FilterMatchMode,
    state: Mutex<SessionState>,
}

impl WorkflowApi {
    /// 创建新的工作流控制器
    ///
    /// # 参数
    /// - service: 优化服务实现(HTTP 或测试替身)
    /// - export_api: 导出协调器
    /// - config: 注入配置(区域设置/过滤匹配模式)
    pub fn new(
        service: Arc<dyn OptimizerService>,
        export_api: Arc<ExportApi>,
        config: &ConfigManager,
    ) -> Self {
        Self {
            service,
            export_api,
            renderer: PlanRenderer::new(config.get_display_locale()),
            filter_match_mode: config.get_filter_match_mode(),
            state: Mutex::new(SessionState::new()),
        }
    }

    // ==========================================
    // 状态访问
    // ==========================================

    fn lock_state(&self) -> ApiResult<MutexGuard<'_, SessionState>> {
        self.state
            .lock()
            .map_err(|e| ApiError::InternalError(format!("会话状态锁获取失败: {}", e)))
    }

    /// 当前工作流步骤
    pub fn current_step(&self) -> WorkflowStep {
        match self.state.lock() {
            Ok(state) => state.step,
            Err(_) => WorkflowStep::Upload,
        }
    }

    /// 当前步骤是否有在途请求
    pub fn is_busy(&self) -> bool {
        match self.state.lock() {
            Ok(state) => state.in_flight.is_some(),
            Err(_) => false,
        }
    }

    /// 当前配置是否满足提交条件
    pub fn can_submit(&self) -> bool {
        match self.state.lock() {
            Ok(state) => {
                state.step == WorkflowStep::Configure
                    && state.in_flight.is_none()
                    && state.config.is_submittable(state.schema.as_ref())
            }
            Err(_) => false,
        }
    }

    /// 会话快照
    pub fn snapshot(&self) -> ApiResult<SessionSnapshot> {
        let state = self.lock_state()?;
        Ok(SessionSnapshot {
            step: state.step,
            busy: state.in_flight,
            sheets: state
                .uploaded
                .as_ref()
                .map(|u| u.sheets.clone())
                .unwrap_or_default(),
            columns: state
                .schema
                .as_ref()
                .map(|s| s.columns.clone())
                .unwrap_or_default(),
            configuration: state.config.clone(),
            can_submit: state.step == WorkflowStep::Configure
                && state.in_flight.is_none()
                && state.config.is_submittable(state.schema.as_ref()),
            has_plan: state.plan.is_some(),
        })
    }

    // ==========================================
    // Upload 步骤
    // ==========================================

    /// 上传工作簿并进入 Configure 步骤
    ///
    /// # 本地前置校验(零网络请求)
    /// - 文件名后缀必须为 .xlsx/.xls
    /// - 文件内容非空
    ///
    /// # 返回
    /// - Ok(Applied(sheets)): 已进入 Configure,携带 sheet 列表
    /// - Ok(Stale): 响应到达时用户已离开发起步骤,被丢弃
    /// - Err(ApiError): 校验失败或服务错误(配置保持不变)
    pub async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> ApiResult<Applied<Vec<String>>> {
        let epoch = {
            let mut state = self.lock_state()?;
            self.ensure_step(&state, WorkflowStep::Upload, WorkflowStep::Configure)?;
            self.ensure_idle(&state)?;

            if FileKind::from_file_name(file_name).is_none() {
                return Err(ApiError::ValidationError(format!(
                    "文件格式不支持: {}(仅支持 .xlsx/.xls)",
                    file_name
                )));
            }
            if bytes.is_empty() {
                return Err(ApiError::ValidationError("文件内容为空".to_string()));
            }

            state.in_flight = Some(OperationKind::Upload);
            state.epoch
        };

        tracing::info!(file_name = %file_name, epoch, "开始上传");
        let result = self.service.upload_file(file_name, bytes).await;

        let mut state = self.lock_state()?;
        if state.epoch != epoch {
            tracing::warn!(epoch, current_epoch = state.epoch, "丢弃过期的上传响应");
            return Ok(Applied::Stale);
        }
        state.in_flight = None;

        let uploaded = result?;
        let sheets = uploaded.sheets.clone();

        // 进入 Configure: 默认选中第一个 sheet,表头行取默认值
        let mut config = LoadConfiguration::default();
        config.sheet_name = uploaded.default_sheet().unwrap_or_default().to_string();
        state.config = config;
        state.uploaded = Some(uploaded);
        state.schema = None;
        state.step = WorkflowStep::Configure;
        tracing::info!(sheet_count = sheets.len(), "上传完成,进入 Configure");

        Ok(Applied::Applied(sheets))
    }

    // ==========================================
    // Configure 步骤 - 列结构发现
    // ==========================================

    /// 对当前 (sheet, 表头行) 执行列名发现
    ///
    /// 进入 Configure 后的首次发现由嵌入方调用本方法;
    /// sheet/表头行变化时由 set_sheet/set_header_row 自动触发
    pub async fn refresh_columns(&self) -> ApiResult<Applied<SchemaRefresh>> {
        let (epoch, file_path, sheet_name, header_row) = {
            let mut state = self.lock_state()?;
            self.ensure_step(&state, WorkflowStep::Configure, WorkflowStep::Configure)?;
            self.ensure_idle(&state)?;

            let file_path = {
                let uploaded = state.uploaded.as_ref().ok_or_else(|| {
                    ApiError::InternalError("Configure 步骤缺少已上传文件".to_string())
                })?;
                if !uploaded.has_sheet(&state.config.sheet_name) {
                    return Err(ApiError::InvalidInput(format!(
                        "sheet 不存在: {}",
                        state.config.sheet_name
                    )));
                }
                uploaded.file_path.clone()
            };

            state.in_flight = Some(OperationKind::FetchColumns);
            (
                state.epoch,
                file_path,
                state.config.sheet_name.clone(),
                state.config.header_row,
            )
        };

        let result = self
            .service
            .fetch_columns(&file_path, &sheet_name, header_row)
            .await;

        let mut state = self.lock_state()?;
        if state.epoch != epoch {
            tracing::warn!(epoch, current_epoch = state.epoch, "丢弃过期的列名响应");
            return Ok(Applied::Stale);
        }
        state.in_flight = None;

        match result {
            Ok(columns) => {
                let schema = SheetSchema {
                    sheet_name,
                    header_row,
                    columns: columns.clone(),
                };
                // 失效选择立即作废,绝不静默保留到提交
                let invalidated = state.config.invalidate_missing_columns(&schema);
                if !invalidated.is_empty() {
                    tracing::warn!(?invalidated, "列结构变化,部分列选择已失效");
                }
                state.schema = Some(schema);
                Ok(Applied::Applied(SchemaRefresh {
                    columns,
                    invalidated,
                }))
            }
            Err(e) => {
                // 发现失败: 无当前列表,提交保持禁用
                state.schema = None;
                Err(e.into())
            }
        }
    }

    /// 切换 sheet,自动触发一次列名发现
    pub async fn set_sheet(&self, sheet_name: &str) -> ApiResult<Applied<SchemaRefresh>> {
        {
            let mut state = self.lock_state()?;
            self.ensure_step(&state, WorkflowStep::Configure, WorkflowStep::Configure)?;
            self.ensure_idle(&state)?;

            let uploaded = state
                .uploaded
                .as_ref()
                .ok_or_else(|| ApiError::InternalError("Configure 步骤缺少已上传文件".to_string()))?;
            if !uploaded.has_sheet(sheet_name) {
                return Err(ApiError::InvalidInput(format!("sheet 不存在: {}", sheet_name)));
            }

            if state.config.sheet_name == sheet_name && state.schema.is_some() {
                // 未发生变化,不触发重复发现
                let columns = state
                    .schema
                    .as_ref()
                    .map(|s| s.columns.clone())
                    .unwrap_or_default();
                return Ok(Applied::Applied(SchemaRefresh {
                    columns,
                    invalidated: Vec::new(),
                }));
            }

            state.config.sheet_name = sheet_name.to_string();
            // 旧快照绑定旧 (sheet, 表头行),立即作废
            state.schema = None;
        }

        self.refresh_columns().await
    }

    /// 修改表头行,自动触发一次列名发现
    pub async fn set_header_row(&self, header_row: u32) -> ApiResult<Applied<SchemaRefresh>> {
        {
            let mut state = self.lock_state()?;
            self.ensure_step(&state, WorkflowStep::Configure, WorkflowStep::Configure)?;
            self.ensure_idle(&state)?;

            if state.config.header_row == header_row && state.schema.is_some() {
                let columns = state.schema.as_ref().map(|s| s.columns.clone()).unwrap_or_default();
                return Ok(Applied::Applied(SchemaRefresh {
                    columns,
                    invalidated: Vec::new(),
                }));
            }

            state.config.header_row = header_row;
            state.schema = None;
        }

        self.refresh_columns().await
    }

    // ==========================================
    // Configure 步骤 - 列映射
    // ==========================================

    /// 选择数量列(必须来自当前列表)
    pub fn set_quantity_column(&self, column: &str) -> ApiResult<()> {
        self.set_mapped_column(column, |config, value| config.quantity_column = value)
    }

    /// 选择重量列(必须来自当前列表)
    pub fn set_weight_column(&self, column: &str) -> ApiResult<()> {
        self.set_mapped_column(column, |config, value| config.weight_column = value)
    }

    /// 选择或清除过滤列
    pub fn set_filter_column(&self, column: Option<&str>) -> ApiResult<()> {
        match column {
            Some(c) => self.set_mapped_column(c, |config, value| config.filter_column = value),
            None => {
                let mut state = self.lock_state()?;
                self.ensure_step(&state, WorkflowStep::Configure, WorkflowStep::Configure)?;
                state.config.filter_column = None;
                state.config.filter_value = None;
                Ok(())
            }
        }
    }

    /// 设置过滤值(自由文本;空值等同无过滤)
    pub fn set_filter_value(&self, value: Option<&str>) -> ApiResult<()> {
        let mut state = self.lock_state()?;
        self.ensure_step(&state, WorkflowStep::Configure, WorkflowStep::Configure)?;
        state.config.filter_value = value.map(|v| v.to_string());
        Ok(())
    }

    fn set_mapped_column(
        &self,
        column: &str,
        apply: impl FnOnce(&mut LoadConfiguration, Option<String>),
    ) -> ApiResult<()> {
        let mut state = self.lock_state()?;
        self.ensure_step(&state, WorkflowStep::Configure, WorkflowStep::Configure)?;

        let schema = state
            .schema
            .as_ref()
            .ok_or_else(|| ApiError::InvalidInput("列结构尚未就绪,请先刷新列名".to_string()))?;
        if !schema.contains_column(column) {
            return Err(ApiError::InvalidInput(format!("列不在当前列表中: {}", column)));
        }

        apply(&mut state.config, Some(column.to_string()));
        Ok(())
    }

    // ==========================================
    // Configure → Results: 排载提交
    // ==========================================

    /// 提交排载计算并进入 Results 步骤
    pub async fn submit(&self) -> ApiResult<Applied<SubmitOutcome>> {
        let (epoch, request, file_path, sheet_name) = {
            let mut state = self.lock_state()?;
            self.ensure_step(&state, WorkflowStep::Configure, WorkflowStep::Results)?;
            self.ensure_idle(&state)?;

            if !state.config.is_submittable(state.schema.as_ref()) {
                return Err(ApiError::ValidationError(
                    "提交条件未满足: sheet、数量列、重量列必须已选且在当前列表中".to_string(),
                ));
            }

            let file_path = {
                let uploaded = state.uploaded.as_ref().ok_or_else(|| {
                    ApiError::InternalError("Configure 步骤缺少已上传文件".to_string())
                })?;
                uploaded.file_path.clone()
            };
            let request = ProcessRequest::from_configuration(
                &file_path,
                &state.config,
                self.filter_match_mode,
            )
            .ok_or_else(|| {
                ApiError::ValidationError("数量列与重量列必须先选择".to_string())
            })?;

            state.in_flight = Some(OperationKind::Process);
            (
                state.epoch,
                request,
                file_path,
                state.config.sheet_name.clone(),
            )
        };

        tracing::info!(sheet = %sheet_name, epoch, "提交排载计算");
        let result = self.service.process(request).await;

        let mut state = self.lock_state()?;
        if state.epoch != epoch {
            tracing::warn!(epoch, current_epoch = state.epoch, "丢弃过期的排载响应");
            return Ok(Applied::Stale);
        }
        state.in_flight = None;

        // 模型边界校验: 不变量破坏 → 拒收整份结果,停留在 Configure
        let plan = LoadingPlan::from_results(result?, file_path, sheet_name)?;
        let container_count = plan.container_count();
        state.plan = Some(Arc::new(plan));
        state.step = WorkflowStep::Results;
        tracing::info!(container_count, "排载完成,进入 Results");

        Ok(Applied::Applied(SubmitOutcome { container_count }))
    }

    // ==========================================
    // Results 步骤
    // ==========================================

    /// 渲染当前结果的展示树(纯映射,不修改模型)
    pub fn render_results(&self) -> ApiResult<PlanView> {
        let state = self.lock_state()?;
        if state.step != WorkflowStep::Results {
            return Err(ApiError::InvalidStateTransition {
                from: state.step,
                to: WorkflowStep::Results,
            });
        }
        let plan = state
            .plan
            .as_ref()
            .ok_or_else(|| ApiError::ValidationError("当前无排载结果".to_string()))?;
        Ok(self.renderer.render(plan))
    }

    /// 导出装箱单并落盘
    ///
    /// # 前置校验(零网络请求)
    /// - 结果模型存在且非空
    pub async fn export_packing_list(&self) -> ApiResult<Applied<ExportApiResponse>> {
        let (epoch, plan) = {
            let mut state = self.lock_state()?;
            self.ensure_step(&state, WorkflowStep::Results, WorkflowStep::Results)?;
            self.ensure_idle(&state)?;

            let plan = state
                .plan
                .clone()
                .ok_or_else(|| ApiError::ValidationError("当前无排载结果,无法导出".to_string()))?;

            state.in_flight = Some(OperationKind::Export);
            (state.epoch, plan)
        };

        // 网络请求在锁外执行;ExportApi 内部还会做空结果前置校验
        let result = self.export_api.request_export(&plan).await;

        let bytes = {
            let mut state = self.lock_state()?;
            if state.epoch != epoch {
                tracing::warn!(epoch, current_epoch = state.epoch, "丢弃过期的导出响应");
                return Ok(Applied::Stale);
            }
            state.in_flight = None;
            result?
        };

        // 落盘是本地操作,不参与纪元竞争
        let response = self.export_api.write_artifact(plan.sheet_name(), &bytes).await?;
        Ok(Applied::Applied(response))
    }

    // ==========================================
    // 回退转换
    // ==========================================

    /// Configure → Upload: 丢弃上传文件与列结构缓存
    pub fn back_to_upload(&self) -> ApiResult<()> {
        let mut state = self.lock_state()?;
        if state.step != WorkflowStep::Configure {
            return Err(ApiError::InvalidStateTransition {
                from: state.step,
                to: WorkflowStep::Upload,
            });
        }

        state.epoch += 1;
        state.in_flight = None;
        state.uploaded = None;
        state.schema = None;
        state.config = LoadConfiguration::default();
        state.plan = None;
        state.step = WorkflowStep::Upload;
        tracing::info!(epoch = state.epoch, "回退至 Upload,下游状态已清空");
        Ok(())
    }

    /// Results → Configure: 丢弃结果模型,保留配置与列结构
    pub fn back_to_configure(&self) -> ApiResult<()> {
        let mut state = self.lock_state()?;
        if state.step != WorkflowStep::Results {
            return Err(ApiError::InvalidStateTransition {
                from: state.step,
                to: WorkflowStep::Configure,
            });
        }

        state.epoch += 1;
        state.in_flight = None;
        state.plan = None;
        state.step = WorkflowStep::Configure;
        tracing::info!(epoch = state.epoch, "回退至 Configure,结果模型已丢弃");
        Ok(())
    }

    // ==========================================
    // 私有校验助手
    // ==========================================

    fn ensure_step(
        &self,
        state: &SessionState,
        expected: WorkflowStep,
        target: WorkflowStep,
    ) -> ApiResult<()> {
        if state.step != expected {
            return Err(ApiError::InvalidStateTransition {
                from: state.step,
                to: target,
            });
        }
        Ok(())
    }

    fn ensure_idle(&self, state: &SessionState) -> ApiResult<()> {
        if let Some(operation) = state.in_flight {
            return Err(ApiError::RequestInFlight { operation });
        }
        Ok(())
    }
}
