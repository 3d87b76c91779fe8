// ==========================================
// 称重 API 集成测试
// ==========================================
// 测试目标: API 层输入校验与错误分类
// （操作员必须能区分"数据问题"与"硬件问题"）
// ==========================================

mod test_helpers;

use std::sync::Arc;

use weighbridge_core::api::{ApiError, WeighingApi};
use weighbridge_core::domain::DepartureInfo;
use weighbridge_core::engine::WeighingWorkflow;

use test_helpers::{create_draft_repo, create_test_db, stable_reading, test_operator};

fn create_api(db_path: &str) -> WeighingApi {
    let repo = create_draft_repo(db_path).expect("Failed to create draft repo");
    let workflow = Arc::new(WeighingWorkflow::new(Arc::clone(&repo)));
    WeighingApi::new(workflow, repo)
}

#[test]
fn test_arrival_departure_via_api() {
    let (_tmp, db_path) = create_test_db().expect("Failed to create test db");
    let api = create_api(&db_path);

    let draft = api
        .record_arrival("01ABC123", &stable_reading(12000.0), &test_operator())
        .expect("进场应成功");

    let fetched = api.get_draft(&draft.draft_id).expect("按 ID 查询应命中");
    assert_eq!(fetched.vehicle_number, "01ABC123");

    let completed = api
        .record_departure("01ABC123", &stable_reading(8000.0), &DepartureInfo::default())
        .expect("出场应成功");
    assert_eq!(completed.net_weight, Some(4000.0));
}

#[test]
fn test_api_error_classification() {
    let (_tmp, db_path) = create_test_db().expect("Failed to create test db");
    let api = create_api(&db_path);
    let op = test_operator();

    // 空车牌 -> 输入错误
    let err = api
        .record_arrival("", &stable_reading(12000.0), &op)
        .expect_err("空车牌应被拒");
    assert!(matches!(err, ApiError::InvalidInput(_)));

    // 重复进场 -> 业务规则错误
    api.record_arrival("01ABC123", &stable_reading(12000.0), &op)
        .expect("首次进场应成功");
    let err = api
        .record_arrival("01ABC123", &stable_reading(12000.0), &op)
        .expect_err("重复进场应被拒");
    assert!(matches!(err, ApiError::BusinessRuleViolation(_)));

    // 无在途单出场 -> 未找到
    let err = api
        .record_departure("99ZZZ999", &stable_reading(8000.0), &DepartureInfo::default())
        .expect_err("无在途单出场应被拒");
    assert!(matches!(err, ApiError::NotFound(_)));

    // 不存在的过磅单 ID -> 未找到
    let err = api.get_draft("no-such-id").expect_err("应未命中");
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[test]
fn test_list_drafts_with_filter() {
    let (_tmp, db_path) = create_test_db().expect("Failed to create test db");
    let api = create_api(&db_path);
    let op = test_operator();

    api.record_arrival("01AAA111", &stable_reading(10000.0), &op)
        .expect("进场应成功");
    api.record_arrival("02BBB222", &stable_reading(11000.0), &op)
        .expect("进场应成功");
    api.record_departure("01AAA111", &stable_reading(6000.0), &DepartureInfo::default())
        .expect("出场应成功");

    let open = api.list_drafts(Some("DRAFT".to_string()), 100).unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].vehicle_number, "02BBB222");

    let done = api.list_drafts(Some("completed".to_string()), 100).unwrap();
    assert_eq!(done.len(), 1);

    let err = api
        .list_drafts(Some("WRONG".to_string()), 100)
        .expect_err("未知状态应被拒");
    assert!(matches!(err, ApiError::InvalidInput(_)));
}
