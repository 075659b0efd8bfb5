//! 지표 프레임.
//!
//! `IndicatorFrame`은 캔들 시계열과 1:1 정렬된 지표 컬럼 묶음입니다.
//! 모든 컬럼의 길이는 캔들 수와 같고, 룩백이 채워지지 않은 구간은
//! `None`입니다. 시계열 전체가 특정 지표의 룩백보다 짧으면 그 컬럼은
//! 전부 `None`이며, 호출자는 부분 시계열에서도 중단 없이 동작해야
//! 합니다.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use chrono::NaiveDate;
use trscan_core::domain::bar::{validate_bars, Bar};

use super::ichimoku::{ichimoku, IchimokuParams, IchimokuPoint};
use super::momentum::{pmo, ppo, rsi, PmoParams, PmoPoint, PpoParams, PpoPoint, RsiParams};
use super::supertrend::{supertrend, SuperTrendParams, SuperTrendPoint};
use super::trend::{ema, macd, EmaParams, MacdParams, MacdPoint};
use super::volatility::{atr, AtrParams};
use super::{IndicatorError, IndicatorResult};

/// 기울기 판정 룩백 (현재 값 vs 3캔들 전 값).
pub const SLOPE_LOOKBACK: usize = 3;

/// 캔들 시계열과 정렬된 지표 컬럼 묶음.
///
/// 불변: 모든 컬럼의 길이 == 캔들 수.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorFrame {
    /// 캔들 날짜
    pub dates: Vec<NaiveDate>,
    /// 종가
    pub closes: Vec<Decimal>,
    /// 고가
    pub highs: Vec<Decimal>,
    /// 저가
    pub lows: Vec<Decimal>,
    /// EMA 3
    pub ema_3: Vec<Option<Decimal>>,
    /// EMA 9
    pub ema_9: Vec<Option<Decimal>>,
    /// EMA 20
    pub ema_20: Vec<Option<Decimal>>,
    /// EMA 34
    pub ema_34: Vec<Option<Decimal>>,
    /// EMA 50
    pub ema_50: Vec<Option<Decimal>>,
    /// EMA 200
    pub ema_200: Vec<Option<Decimal>>,
    /// MACD 12/26/9
    pub macd: Vec<MacdPoint>,
    /// PPO 12/26/9
    pub ppo: Vec<PpoPoint>,
    /// PMO 35/20/10
    pub pmo: Vec<PmoPoint>,
    /// RSI 14
    pub rsi: Vec<Option<Decimal>>,
    /// ATR 14
    pub atr: Vec<Option<Decimal>>,
    /// SuperTrend 10/3.0
    pub supertrend: Vec<SuperTrendPoint>,
    /// Ichimoku 9/26/52
    pub ichimoku: Vec<IchimokuPoint>,
    /// EMA 9 상승 여부 (3캔들 전 대비)
    pub ema_9_rising: Vec<Option<bool>>,
    /// EMA 34 상승 여부
    pub ema_34_rising: Vec<Option<bool>>,
    /// PPO 라인 상승 여부
    pub ppo_rising: Vec<Option<bool>>,
    /// PMO 라인 상승 여부
    pub pmo_rising: Vec<Option<bool>>,
}

impl IndicatorFrame {
    /// 캔들 수를 반환합니다.
    pub fn len(&self) -> usize {
        self.closes.len()
    }

    /// 빈 프레임인지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }
}

/// 통합 지표 엔진.
///
/// 검증된 캔들 시계열에서 프레임 전체를 한 번에 계산합니다.
/// 순수 함수이며, 같은 입력에는 항상 비트 단위로 같은 출력을 냅니다.
#[derive(Debug, Clone)]
pub struct IndicatorEngine {
    ppo_params: PpoParams,
    pmo_params: PmoParams,
    rsi_params: RsiParams,
    atr_params: AtrParams,
    macd_params: MacdParams,
    supertrend_params: SuperTrendParams,
    ichimoku_params: IchimokuParams,
}

impl Default for IndicatorEngine {
    fn default() -> Self {
        Self {
            ppo_params: PpoParams::default(),
            pmo_params: PmoParams::default(),
            rsi_params: RsiParams::default(),
            atr_params: AtrParams::default(),
            macd_params: MacdParams::default(),
            supertrend_params: SuperTrendParams::default(),
            ichimoku_params: IchimokuParams::default(),
        }
    }
}

impl IndicatorEngine {
    /// 기본 파라미터로 엔진을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 캔들 시계열에서 지표 프레임을 계산합니다.
    ///
    /// 입력이 형식적으로 잘못된 경우(비단조 날짜, 음수 가격)
    /// `IndicatorError::InvalidData`로 즉시 실패합니다. 시계열이 특정
    /// 지표의 룩백보다 짧은 것은 에러가 아니며, 해당 컬럼이 전부
    /// `None`이 됩니다.
    pub fn compute_frame(&self, bars: &[Bar]) -> IndicatorResult<IndicatorFrame> {
        validate_bars(bars).map_err(|e| IndicatorError::InvalidData(e.to_string()))?;

        let n = bars.len();
        let dates: Vec<NaiveDate> = bars.iter().map(|b| b.date).collect();
        let closes: Vec<Decimal> = bars.iter().map(|b| b.close).collect();
        let highs: Vec<Decimal> = bars.iter().map(|b| b.high).collect();
        let lows: Vec<Decimal> = bars.iter().map(|b| b.low).collect();

        let ema_column = |period: usize| -> IndicatorResult<Vec<Option<Decimal>>> {
            match ema(&closes, EmaParams { period }) {
                Ok(v) => Ok(v),
                Err(IndicatorError::InsufficientData { .. }) => Ok(vec![None; n]),
                Err(e) => Err(e),
            }
        };

        let ema_3 = ema_column(3)?;
        let ema_9 = ema_column(9)?;
        let ema_20 = ema_column(20)?;
        let ema_34 = ema_column(34)?;
        let ema_50 = ema_column(50)?;
        let ema_200 = ema_column(200)?;

        let macd_column = match macd(&closes, self.macd_params) {
            Ok(v) => v,
            Err(IndicatorError::InsufficientData { .. }) => vec![
                MacdPoint { macd: None, signal: None, histogram: None };
                n
            ],
            Err(e) => return Err(e),
        };

        let ppo_column = match ppo(&closes, self.ppo_params) {
            Ok(v) => v,
            Err(IndicatorError::InsufficientData { .. }) => vec![
                PpoPoint { line: None, signal: None, histogram: None };
                n
            ],
            Err(e) => return Err(e),
        };

        let pmo_column = match pmo(&closes, self.pmo_params) {
            Ok(v) => v,
            Err(IndicatorError::InsufficientData { .. }) => {
                vec![PmoPoint { line: None, signal: None }; n]
            }
            Err(e) => return Err(e),
        };

        let rsi_column = match rsi(&closes, self.rsi_params) {
            Ok(v) => v,
            Err(IndicatorError::InsufficientData { .. }) => vec![None; n],
            Err(e) => return Err(e),
        };

        let atr_column = match atr(&highs, &lows, &closes, self.atr_params) {
            Ok(v) => v,
            Err(IndicatorError::InsufficientData { .. }) => vec![None; n],
            Err(e) => return Err(e),
        };

        let supertrend_column = match supertrend(&highs, &lows, &closes, self.supertrend_params) {
            Ok(v) => v,
            Err(IndicatorError::InsufficientData { .. }) => vec![
                SuperTrendPoint {
                    value: None,
                    is_uptrend: true,
                    flipped_up: false,
                    flipped_down: false,
                };
                n
            ],
            Err(e) => return Err(e),
        };

        let ichimoku_column = match ichimoku(&highs, &lows, &closes, self.ichimoku_params) {
            Ok(v) => v,
            Err(IndicatorError::InsufficientData { .. }) => vec![
                IchimokuPoint {
                    tenkan: None,
                    kijun: None,
                    senkou_a: None,
                    senkou_b: None,
                    chikou: None,
                };
                n
            ],
            Err(e) => return Err(e),
        };

        let ppo_line: Vec<Option<Decimal>> = ppo_column.iter().map(|p| p.line).collect();
        let pmo_line: Vec<Option<Decimal>> = pmo_column.iter().map(|p| p.line).collect();

        let ema_9_rising = rising_flags(&ema_9);
        let ema_34_rising = rising_flags(&ema_34);
        let ppo_rising = rising_flags(&ppo_line);
        let pmo_rising = rising_flags(&pmo_line);

        Ok(IndicatorFrame {
            dates,
            closes,
            highs,
            lows,
            ema_3,
            ema_9,
            ema_20,
            ema_34,
            ema_50,
            ema_200,
            macd: macd_column,
            ppo: ppo_column,
            pmo: pmo_column,
            rsi: rsi_column,
            atr: atr_column,
            supertrend: supertrend_column,
            ichimoku: ichimoku_column,
            ema_9_rising,
            ema_34_rising,
            ppo_rising,
            pmo_rising,
        })
    }
}

/// 상승 플래그 시계열: 현재 값 > SLOPE_LOOKBACK 캔들 전 값.
///
/// 둘 중 하나라도 None이면 판정 불가(None)입니다.
fn rising_flags(series: &[Option<Decimal>]) -> Vec<Option<bool>> {
    (0..series.len())
        .map(|i| {
            if i < SLOPE_LOOKBACK {
                return None;
            }
            match (series[i], series[i - SLOPE_LOOKBACK]) {
                (Some(now), Some(before)) => Some(now > before),
                _ => None,
            }
        })
        .collect()
}
