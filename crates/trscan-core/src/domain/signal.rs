//! TR 스테이지와 매수 신호 타입.
//!
//! 이 모듈은 스테이지 분류 결과와, 분류기가 매수 스테이지로 전환될 때
//! 생성되는 `BuySignal`, 그리고 레이블링 파이프라인이 만드는 학습 레코드
//! `LabeledSignal`을 정의합니다. 모두 생성 후 변경되지 않는 값입니다.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{Symbol, Timeframe};

/// TR 스테이지 분류.
///
/// EMA 정렬과 PPO/PMO 모멘텀으로 결정되는 6단계 추세 분류입니다.
/// 지표의 룩백 구간이 채워지지 않은 캔들은 `Indeterminate`로 분류되며,
/// 절대 스테이지를 추측하지 않습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrStage {
    /// 상승 3단계 - 강한 매수
    StrongBuy,
    /// 상승 2단계 - 매수
    Buy,
    /// 상승 1단계 - 중립 매수 (EMA3 >= EMA9, 추세 초기)
    NeutralBuy,
    /// 하락 1단계 - 중립 매도 (EMA3 < EMA9, 추세 초기)
    NeutralSell,
    /// 하락 2단계 - 매도
    Sell,
    /// 하락 3단계 - 강한 매도
    StrongSell,
    /// 판정 불가 - 지표 룩백 미충족
    Indeterminate,
}

impl TrStage {
    /// ML feature용 숫자 스테이지 코드 (1=StrongBuy ... 6=StrongSell).
    ///
    /// `Indeterminate`는 feature로 변환될 수 없으므로 None을 반환합니다.
    pub fn stage_code(&self) -> Option<u8> {
        match self {
            TrStage::StrongBuy => Some(1),
            TrStage::Buy => Some(2),
            TrStage::NeutralBuy => Some(3),
            TrStage::NeutralSell => Some(4),
            TrStage::Sell => Some(5),
            TrStage::StrongSell => Some(6),
            TrStage::Indeterminate => None,
        }
    }

    /// 매수 계열 스테이지(StrongBuy 또는 Buy)인지 확인합니다.
    pub fn is_buy(&self) -> bool {
        matches!(self, TrStage::StrongBuy | TrStage::Buy)
    }

    /// 매도 계열 스테이지(StrongSell 또는 Sell)인지 확인합니다.
    pub fn is_sell(&self) -> bool {
        matches!(self, TrStage::StrongSell | TrStage::Sell)
    }

    /// 분류가 확정된 스테이지인지 확인합니다.
    pub fn is_determinate(&self) -> bool {
        !matches!(self, TrStage::Indeterminate)
    }
}

impl fmt::Display for TrStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TrStage::StrongBuy => "Strong Buy",
            TrStage::Buy => "Buy",
            TrStage::NeutralBuy => "Neutral Buy",
            TrStage::NeutralSell => "Neutral Sell",
            TrStage::Sell => "Sell",
            TrStage::StrongSell => "Strong Sell",
            TrStage::Indeterminate => "Indeterminate",
        };
        write!(f, "{}", s)
    }
}

/// 신호 품질 플래그.
///
/// `has_rs_chaikin`은 상대강도와 Chaikin A/D 백분위가 모두 유니버스 상위
/// 5%에 드는 엘리트 신호 표시이며, 외부 순위 제공자 입력으로만 설정됩니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityFlags {
    /// 진입가가 매수 포인트 ±5% 구간 안에 있음
    pub has_buy_point: bool,
    /// 진입가가 장기 EMA(50) 위에 있음
    pub has_uptrend: bool,
    /// 상대강도 + Chaikin A/D 백분위 모두 95 이상 (엘리트)
    pub has_rs_chaikin: bool,
}

impl QualityFlags {
    /// 품질 레벨 (1~4).
    ///
    /// 1 = 기본, 2 = 매수 포인트, 3 = 엘리트, 4 = 매수 포인트 + 엘리트.
    pub fn quality_level(&self) -> u8 {
        match (self.has_buy_point, self.has_rs_chaikin) {
            (false, false) => 1,
            (true, false) => 2,
            (false, true) => 3,
            (true, true) => 4,
        }
    }

    /// 엘리트 신호인지 확인합니다.
    pub fn is_elite(&self) -> bool {
        self.has_rs_chaikin
    }
}

/// 매수 신호.
///
/// 스테이지 분류기가 매수 스테이지로 전환되는 캔들에서 생성됩니다.
/// 진입 시점의 지표 스냅샷을 함께 담아, 이후 feature 추출이 이 레코드만으로
/// 결정적으로 재현되도록 합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuySignal {
    /// 종목 심볼
    pub symbol: Symbol,
    /// 타임프레임
    pub timeframe: Timeframe,
    /// 진입 날짜 (신호 발생 캔들)
    pub entry_date: NaiveDate,
    /// 진입가 (신호 캔들 종가)
    pub entry_price: Decimal,
    /// 신호 발생 스테이지
    pub stage: TrStage,
    /// 매수 포인트 (최근 주요 고점, 없을 수 있음)
    pub buy_point: Option<Decimal>,
    /// 손절가 (진입가의 90%)
    pub stop_loss: Decimal,
    /// 진입 시점 EMA 3
    pub ema_3: Decimal,
    /// 진입 시점 EMA 9
    pub ema_9: Decimal,
    /// 진입 시점 EMA 20
    pub ema_20: Decimal,
    /// 진입 시점 EMA 34
    pub ema_34: Decimal,
    /// 진입 시점 PPO 라인 값
    pub ppo_value: Decimal,
    /// 진입 시점 PPO 히스토그램
    pub ppo_histogram: Decimal,
    /// 진입 시점 PMO 라인 값
    pub pmo_value: Decimal,
    /// 품질 플래그
    pub flags: QualityFlags,
}

/// 레이블링 결과.
///
/// 데이터셋에 남는 신호는 정확히 둘 중 하나의 결과를 가집니다.
/// 제외된 신호(데이터 부족, 손익 없는 미결 상태)는 이 타입에 도달하지
/// 않습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// 목표 도달 또는 이력 종료 시점에 수익 중
    Success,
    /// 손절 도달
    Failure,
}

/// 레이블된 신호 - 불변 학습 레코드.
///
/// feature 벡터는 내장된 신호 스냅샷에서 결정적으로 파생되므로 별도로
/// 저장하지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledSignal {
    /// 원본 매수 신호 (지표 스냅샷 포함)
    pub signal: BuySignal,
    /// 결과 레이블
    pub outcome: Outcome,
    /// 결과 확정까지 걸린 캔들 수 (이력 종료로 확정된 경우 None)
    pub bars_to_resolution: Option<u32>,
    /// 관찰된 최대 수익률 (%)
    pub max_gain_pct: Decimal,
    /// 관찰된 최대 손실률 (%)
    pub max_drawdown_pct: Decimal,
}

impl LabeledSignal {
    /// 성공 레이블인지 확인합니다.
    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }
}
